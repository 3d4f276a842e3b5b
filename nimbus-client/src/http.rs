//! reqwest-backed implementation of the transport seam.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use nimbus_core::transport::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportError};

/// HTTP request timeout. Generous enough for a slow identity endpoint while
/// still failing in bounded time.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport backed by a pooled [`reqwest::Client`].
///
/// Clone is cheap; the underlying client shares its connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Create a transport around an existing client, sharing its pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.uri),
            HttpMethod::Post => self.client.post(&request.uri),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| TransportError::Request {
            uri: request.uri.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.map_err(|e| TransportError::Request {
            uri: request.uri.clone(),
            message: format!("failed to read response body: {e}"),
        })?;

        debug!(method = %request.method, uri = %request.uri, status = status.as_u16(), "request complete");

        Ok(ApiResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
