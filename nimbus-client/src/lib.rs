//! # Nimbus Client
//!
//! Production HTTP transport for the Nimbus Cloud identity client.
//!
//! [`HttpTransport`] implements the [`Transport`](nimbus_core::Transport)
//! seam over `reqwest`; [`session`] wires it into a ready-to-use
//! [`TokenSession`].
//!
//! # Quick Start
//!
//! ```no_run
//! use nimbus_client::session;
//! use nimbus_core::{AuthMethod, Credentials, UserType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nimbus_core::AuthError> {
//!     let credentials = Credentials::new("alice", "0123abcd", UserType::Username,
//!                                        AuthMethod::ApiKey, "dfw");
//!     let mut session = session(credentials)?;
//!     let token = session.valid_token().await?;
//!     println!("X-Auth-Token: {token}");
//!     Ok(())
//! }
//! ```

mod http;

pub use http::HttpTransport;

pub use nimbus_core::{AuthError, AuthMethod, Credentials, TokenSession, UserType};

/// A token session over the default HTTP transport.
pub type HttpTokenSession = TokenSession<HttpTransport>;

/// Build a [`TokenSession`] over the default HTTP transport.
pub fn session(credentials: Credentials) -> Result<HttpTokenSession, AuthError> {
    let transport = HttpTransport::new()?;
    TokenSession::new(credentials, transport)
}
