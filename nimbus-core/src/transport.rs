//! The transport seam between the session and the network.
//!
//! This module provides:
//! - [`ApiRequest`] / [`ApiResponse`] - plain value types describing one
//!   exchange with the identity API
//! - [`Transport`] - trait implemented by HTTP backends
//!
//! The session composes requests from these value types and hands them to
//! whatever [`Transport`] it was constructed with; TLS, connection pooling,
//! and wire-level header formation all belong to the implementation.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP verbs the identity protocol uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-formed request ready for a [`Transport`] to send.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Build a request for `https://{host}{path}` with JSON content headers.
    pub fn new(method: HttpMethod, host: &str, path: &str) -> Self {
        Self {
            method,
            uri: format!("https://{host}{path}"),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    /// Add a header, replacing any existing header of the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a serialized JSON body.
    pub fn with_json_body(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Switch to plain HTTP, for private deployments and tests.
    pub fn insecure(mut self) -> Self {
        if let Some(rest) = self.uri.strip_prefix("https://") {
            self.uri = format!("http://{rest}");
        }
        self
    }
}

/// A transport-level response: the status line plus the body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for transport implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {uri} failed: {message}")]
    Request { uri: String, message: String },

    /// The request descriptor could not be converted for the backend.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Abstraction over the HTTP backend used by the session.
///
/// The session only ever issues GET and POST requests and reads back the
/// status line and body text; everything else is up to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the response status line and body text.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
