//! Error taxonomy for the identity client.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by credential encoding and the token session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An unknown datacenter or region was requested.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The credential method and user-type combination is invalid, or no
    /// token could be derived from the session state.
    #[error("credential error: {message}")]
    Credential { message: String },

    /// The identity endpoint rejected the request, or retries were
    /// exhausted.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The authenticated user lacks the rights for the requested resource.
    #[error("authorization failed: {message}")]
    Authorization { message: String },

    /// The expiration timestamp matched none of the accepted formats.
    #[error("unknown time format: {value}")]
    TimeFormat { value: String },

    /// A field expected in the stored authentication response is absent.
    #[error("missing field in authentication response: {path}")]
    MissingField { path: String },

    /// The transport failed below the HTTP status level.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
