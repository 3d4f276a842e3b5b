//! # Nimbus Core
//!
//! Client-side authentication manager for the Nimbus Cloud identity API.
//!
//! This crate provides:
//! - Credential encoding for the supported authentication methods
//! - [`TokenSession`] - token acquisition, expiry tracking, and transparent
//!   renewal on read
//! - Read-only accessors over the identity service catalog (account id,
//!   datacenter list, regional endpoints)
//! - The [`Transport`] seam an HTTP backend plugs into
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nimbus_core::{AuthMethod, Credentials, TokenSession, UserType};
//!
//! async fn bearer<T: nimbus_core::Transport>(transport: T) -> Result<String, nimbus_core::AuthError> {
//!     let credentials = Credentials::new("alice", "0123abcd", UserType::Username,
//!                                        AuthMethod::ApiKey, "dfw");
//!     let mut session = TokenSession::new(credentials, transport)?;
//!     session.valid_token().await
//! }
//! ```

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod expiry;
pub mod region;
pub mod session;
pub mod transport;

// Re-export commonly used types at crate root
pub use catalog::{Access, AuthResponse, CatalogService, Endpoint};

pub use credentials::{
    APIKEY_CREDENTIALS_KEY,
    AuthMethod,
    Credentials,
    Secret,
    UserType,
};

pub use error::AuthError;

pub use region::identity_api_host;

pub use session::{
    RegionalEndpoints,
    TokenSession,
};

pub use transport::{
    ApiRequest,
    ApiResponse,
    HttpMethod,
    Transport,
    TransportError,
};
