//! Credential methods and authentication request-body encoding.
//!
//! This module provides:
//! - [`AuthMethod`] / [`UserType`] - the credential method and the
//!   user-identification variants the identity API accepts
//! - [`Secret`] - wrapper for the credential secret with redacted output
//! - [`Credentials`] - the full credential set for one datacenter
//!
//! The identity API documents nine valid method and user-type combinations;
//! any other pairing is rejected when the request body is built, before
//! anything touches the network.

use std::fmt;

use serde_json::{Value, json};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::AuthError;

/// JSON key of the vendor api-key credential block.
///
/// Also the final path segment when listing just the api-key credentials of
/// a user.
pub const APIKEY_CREDENTIALS_KEY: &str = "NIM-KEY:apiKeyCredentials";

/// Credential method presented to the identity API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Account api key.
    ApiKey,
    /// Account password.
    Password,
    /// A previously issued token.
    Token,
    /// Validate an existing token without issuing a new one.
    Validate,
}

impl AuthMethod {
    /// The lowercase name the API documentation uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ApiKey => "apikey",
            AuthMethod::Password => "password",
            AuthMethod::Token => "token",
            AuthMethod::Validate => "validate",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the user id in [`Credentials`] should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    /// An account username.
    Username,
    /// A tenant id.
    TenantId,
    /// A tenant name.
    TenantName,
}

impl UserType {
    /// The lowercase name the API documentation uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Username => "username",
            UserType::TenantId => "tenantid",
            UserType::TenantName => "tenantname",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret credential value: an api key, password, or token.
///
/// Debug and Display show `[REDACTED]` instead of the value, and the inner
/// string is zeroed when dropped. The value is only reachable through
/// [`expose()`](Secret::expose).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// The credential set a [`TokenSession`](crate::session::TokenSession) is
/// constructed from.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username, tenant id, or tenant name, per `user_type`.
    pub user_id: String,
    /// Api key, password, or token, per `method`.
    pub secret: Secret,
    pub user_type: UserType,
    pub method: AuthMethod,
    /// Datacenter code selecting the identity endpoint.
    pub datacenter: String,
}

impl Credentials {
    /// Assemble a credential set.
    pub fn new(
        user_id: impl Into<String>,
        secret: impl Into<String>,
        user_type: UserType,
        method: AuthMethod,
        datacenter: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            secret: Secret::new(secret),
            user_type,
            method,
            datacenter: datacenter.into(),
        }
    }

    /// Build the JSON authentication request body for this credential set.
    ///
    /// The shape depends on the method and user type. Fails with
    /// [`AuthError::Credential`] for any combination the identity API does
    /// not document.
    pub fn request_body(&self) -> Result<Value, AuthError> {
        let body = match (self.method, self.user_type) {
            (AuthMethod::ApiKey, UserType::Username) => json!({
                "auth": {
                    "NIM-KEY:apiKeyCredentials": {
                        "username": self.user_id,
                        "apiKey": self.secret.expose(),
                    }
                }
            }),
            (
                AuthMethod::ApiKey | AuthMethod::Password | AuthMethod::Token,
                UserType::TenantId,
            ) => json!({
                "auth": {
                    "tenantId": self.user_id,
                    "token": { "id": self.secret.expose() },
                }
            }),
            (AuthMethod::Password, UserType::Username) => json!({
                "auth": {
                    "passwordCredentials": {
                        "username": self.user_id,
                        "password": self.secret.expose(),
                    }
                }
            }),
            (AuthMethod::Token, UserType::TenantName) => json!({
                "auth": {
                    "tenantName": self.user_id,
                    "token": { "id": self.secret.expose() },
                }
            }),
            (AuthMethod::Validate, _) => json!({
                "auth": {
                    "token": { "id": self.secret.expose() },
                }
            }),
            (method, user_type) => {
                return Err(AuthError::Credential {
                    message: format!(
                        "unknown user type ({}) for authentication method ({})",
                        user_type.as_str(),
                        method.as_str()
                    ),
                });
            }
        };
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_for(method: AuthMethod, user_type: UserType) -> Result<Value, AuthError> {
        Credentials::new("alice", "s3cret", user_type, method, "dfw").request_body()
    }

    #[test]
    fn test_apikey_username_uses_vendor_block() {
        let body = body_for(AuthMethod::ApiKey, UserType::Username).unwrap();
        let block = &body["auth"][APIKEY_CREDENTIALS_KEY];
        assert_eq!(block["username"], "alice");
        assert_eq!(block["apiKey"], "s3cret");
    }

    #[test]
    fn test_password_username_uses_password_credentials() {
        let body = body_for(AuthMethod::Password, UserType::Username).unwrap();
        let block = &body["auth"]["passwordCredentials"];
        assert_eq!(block["username"], "alice");
        assert_eq!(block["password"], "s3cret");
    }

    #[test]
    fn test_tenant_id_variants_share_token_shape() {
        for method in [AuthMethod::ApiKey, AuthMethod::Password, AuthMethod::Token] {
            let body = body_for(method, UserType::TenantId).unwrap();
            assert_eq!(body["auth"]["tenantId"], "alice");
            assert_eq!(body["auth"]["token"]["id"], "s3cret");
        }
    }

    #[test]
    fn test_token_tenant_name() {
        let body = body_for(AuthMethod::Token, UserType::TenantName).unwrap();
        assert_eq!(body["auth"]["tenantName"], "alice");
        assert_eq!(body["auth"]["token"]["id"], "s3cret");
    }

    #[test]
    fn test_validate_ignores_user_type() {
        for user_type in [UserType::Username, UserType::TenantId, UserType::TenantName] {
            let body = body_for(AuthMethod::Validate, user_type).unwrap();
            assert_eq!(body["auth"]["token"]["id"], "s3cret");
            assert!(body["auth"].get("tenantId").is_none());
            assert!(body["auth"].get("tenantName").is_none());
        }
    }

    #[test]
    fn test_invalid_combinations_are_rejected() {
        for (method, user_type) in [
            (AuthMethod::ApiKey, UserType::TenantName),
            (AuthMethod::Password, UserType::TenantName),
            (AuthMethod::Token, UserType::Username),
        ] {
            let err = body_for(method, user_type).unwrap_err();
            match err {
                AuthError::Credential { message } => {
                    assert!(message.contains(user_type.as_str()));
                    assert!(message.contains(method.as_str()));
                }
                other => panic!("expected AuthError::Credential, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_secret_never_leaks_through_debug_or_display() {
        let credentials =
            Credentials::new("alice", "s3cret", UserType::Username, AuthMethod::ApiKey, "dfw");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("REDACTED"));
        assert_eq!(format!("{}", credentials.secret), "[REDACTED]");
    }
}
