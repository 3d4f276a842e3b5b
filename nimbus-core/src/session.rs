//! The token session: acquisition, expiry tracking, and catalog accessors.
//!
//! This module provides [`TokenSession`], the stateful heart of the client.
//! A session owns one pre-built authentication request and at most one
//! identity response. The response is replaced wholesale on every successful
//! authentication and never partially updated, so accessors always observe
//! one consistent response. Every token read checks expiration first and
//! re-authenticates transparently when the token is gone or about to go.
//!
//! # Example
//!
//! ```rust,ignore
//! use nimbus_core::{AuthMethod, Credentials, TokenSession, UserType};
//!
//! let credentials = Credentials::new("alice", "0123abcd", UserType::Username,
//!                                    AuthMethod::ApiKey, "dfw");
//! let mut session = TokenSession::new(credentials, transport)?;
//! let token = session.valid_token().await?;
//! ```

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::catalog::{Access, AuthResponse};
use crate::credentials::{APIKEY_CREDENTIALS_KEY, Credentials};
use crate::error::AuthError;
use crate::expiry;
use crate::region;
use crate::transport::{ApiRequest, ApiResponse, HttpMethod, Transport};

/// Path for token issuance.
const TOKENS_PATH: &str = "/v2.0/tokens";

/// Catalog entry carrying the storage endpoints and the account id.
const STORAGE_SERVICE: &str = "cloudFiles";

/// Catalog entry carrying the backup API endpoints.
const BACKUP_SERVICE: &str = "cloudBackup";

/// Additional attempts after a 404 from the identity endpoint.
const DEFAULT_AUTH_RETRIES: u32 = 5;

/// Tolerance window, in seconds, treated as "about to expire".
const NEAR_EXPIRY_TOLERANCE_SECS: i64 = 2;

/// Pause before renewing a near-expiry token, giving the issuer time to
/// roll the token over.
const RENEWAL_PAUSE: Duration = Duration::from_secs(3);

/// The public and internal URLs of one regional service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalEndpoints {
    /// Externally routable URL.
    pub public_url: String,
    /// Internally routable (service-net) URL.
    pub internal_url: String,
}

/// Client-side authentication session for the identity API.
///
/// Holds the credentials' pre-built request, the transport, and the last
/// successful response. All state-changing operations take `&mut self`;
/// a host that shares a session across tasks must serialize access itself.
#[derive(Debug)]
pub struct TokenSession<T: Transport> {
    transport: T,
    auth_request: ApiRequest,
    identity_host: String,
    credential_user_id: String,
    auth_data: Option<Access>,
    renewal_pause: Duration,
}

impl<T: Transport> TokenSession<T> {
    /// Build a session for the given credentials.
    ///
    /// Resolves the identity host for the credentials' datacenter and
    /// encodes the authentication request body once; both stay fixed for
    /// the lifetime of the session.
    pub fn new(credentials: Credentials, transport: T) -> Result<Self, AuthError> {
        let identity_host = region::identity_api_host(&credentials.datacenter)?;
        let body = credentials.request_body()?;
        let auth_request =
            ApiRequest::new(HttpMethod::Post, &identity_host, TOKENS_PATH).with_json_body(&body);

        Ok(Self {
            transport,
            auth_request,
            identity_host,
            credential_user_id: credentials.user_id,
            auth_data: None,
            renewal_pause: RENEWAL_PAUSE,
        })
    }

    /// Override the pause taken before renewing a near-expiry token.
    pub fn with_renewal_pause(mut self, pause: Duration) -> Self {
        self.renewal_pause = pause;
        self
    }

    /// Obtain a fresh token from the identity endpoint.
    ///
    /// Tokens are not instance specific and typically stay valid for a few
    /// hours. A 404 means the identity service is temporarily unavailable
    /// and the request is retried, up to `max_retries` more times. Any
    /// other status at or above 400 fails immediately.
    pub async fn authenticate(&mut self, max_retries: u32) -> Result<String, AuthError> {
        for remaining in (0..=max_retries).rev() {
            debug!(uri = %self.auth_request.uri, "requesting token");
            let response = self.transport.send(&self.auth_request).await?;

            match response.status {
                200 => return self.store_response(&response),
                404 => {
                    error!(
                        reason = %response.reason,
                        remaining,
                        "identity service unavailable, retrying"
                    );
                }
                status if status >= 400 => {
                    error!(status, reason = %response.reason, "failed to authenticate");
                    return Err(AuthError::Authentication {
                        message: format!("{}: {}", status, response.body),
                    });
                }
                status => {
                    // Legacy quirk kept for compatibility: an unrecognized
                    // status resets the session and yields an empty token
                    // instead of failing.
                    warn!(status, reason = %response.reason, "unexpected status, clearing session");
                    self.auth_data = None;
                    return Ok(String::new());
                }
            }
        }

        error!("no more retries for authentication");
        Err(AuthError::Authentication {
            message: "retries exhausted".to_string(),
        })
    }

    /// Whether the held token has expired, within `tolerance_secs` of now.
    ///
    /// A session that has never authenticated, or whose response carries no
    /// expiration stamp, is treated as expired. An unparseable stamp fails
    /// with [`AuthError::TimeFormat`].
    pub fn is_expired(&self, tolerance_secs: i64) -> Result<bool, AuthError> {
        let stamp = match self.expiration_stamp() {
            Some(stamp) => stamp,
            None => {
                debug!("no token data to check against");
                return Ok(true);
            }
        };

        let expiry = expiry::parse_expiration(stamp)?;
        let now = Utc::now().naive_utc();
        let expired = !expiry::outlives(expiry, now, tolerance_secs);
        debug!(%expiry, %now, tolerance_secs, expired, "checked token expiration");
        Ok(expired)
    }

    /// A valid bearer token, re-authenticating when needed.
    ///
    /// An expired token triggers an immediate re-authentication; a token
    /// within two seconds of expiry waits out the renewal pause first.
    /// Either way this accessor can block on the network, so callers must
    /// tolerate variable latency.
    pub async fn valid_token(&mut self) -> Result<String, AuthError> {
        if self.is_expired(0)? {
            return self.authenticate(DEFAULT_AUTH_RETRIES).await;
        }

        if self.is_expired(NEAR_EXPIRY_TOLERANCE_SECS)? {
            info!(pause = ?self.renewal_pause, "token about to expire, pausing before renewal");
            tokio::time::sleep(self.renewal_pause).await;
            return self.authenticate(DEFAULT_AUTH_RETRIES).await;
        }

        self.token_id().map(str::to_string)
    }

    /// The tenant id the token was issued for.
    pub fn tenant_id(&self) -> Result<&str, AuthError> {
        self.access()?
            .tenant
            .as_ref()
            .and_then(|tenant| tenant.id.as_deref())
            .ok_or_else(|| AuthError::MissingField {
                path: "access.tenant.id".to_string(),
            })
    }

    /// The tenant name the token was issued for.
    pub fn tenant_name(&self) -> Result<&str, AuthError> {
        self.access()?
            .tenant
            .as_ref()
            .and_then(|tenant| tenant.name.as_deref())
            .ok_or_else(|| AuthError::MissingField {
                path: "access.tenant.name".to_string(),
            })
    }

    /// The authenticated user id.
    pub fn user_id(&self) -> Result<&str, AuthError> {
        self.access()?
            .user
            .as_ref()
            .and_then(|user| user.id.as_deref())
            .ok_or_else(|| AuthError::MissingField {
                path: "access.user.id".to_string(),
            })
    }

    /// The mosso-style account id.
    ///
    /// Scans the storage entries of the catalog in order and returns the
    /// first non-empty endpoint tenant id. All datacenters are assumed to
    /// carry the same account id.
    pub fn account_id(&self) -> Result<&str, AuthError> {
        for service in self.access()?.services_named(STORAGE_SERVICE)? {
            for endpoint in &service.endpoints {
                if !endpoint.tenant_id.is_empty() {
                    return Ok(&endpoint.tenant_id);
                }
            }
        }
        Err(AuthError::MissingField {
            path: format!("access.serviceCatalog.{STORAGE_SERVICE}.endpoints.tenantId"),
        })
    }

    /// The region of every storage endpoint, in catalog order.
    ///
    /// Duplicates are retained. Requires a valid token, so this call can
    /// itself re-authenticate.
    pub async fn datacenters(&mut self) -> Result<Vec<String>, AuthError> {
        self.valid_token().await?;

        let mut regions = Vec::new();
        for service in self.access()?.services_named(STORAGE_SERVICE)? {
            for endpoint in &service.endpoints {
                regions.push(endpoint.region.clone());
            }
        }
        Ok(regions)
    }

    /// The public and internal URLs for `service_name` in `region`.
    ///
    /// The first endpoint matching the region wins. Requires a valid token,
    /// so this call can itself re-authenticate.
    pub async fn regional_endpoints(
        &mut self,
        service_name: &str,
        region: &str,
    ) -> Result<RegionalEndpoints, AuthError> {
        self.valid_token().await?;

        for service in self.access()?.services_named(service_name)? {
            for endpoint in &service.endpoints {
                if endpoint.region == region {
                    let public_url = endpoint.public_url.clone().ok_or_else(|| {
                        AuthError::MissingField {
                            path: format!(
                                "access.serviceCatalog.{service_name}.endpoints.publicURL"
                            ),
                        }
                    })?;
                    let internal_url = endpoint.internal_url.clone().ok_or_else(|| {
                        AuthError::MissingField {
                            path: format!(
                                "access.serviceCatalog.{service_name}.endpoints.internalURL"
                            ),
                        }
                    })?;
                    return Ok(RegionalEndpoints {
                        public_url,
                        internal_url,
                    });
                }
            }
        }

        Err(AuthError::Configuration {
            message: format!("no {service_name} endpoint in region {region}"),
        })
    }

    /// The host serving the backup API in `region`.
    ///
    /// The region is matched case-insensitively (catalog regions are upper
    /// case). Only the host portion of the endpoint URL is returned, with
    /// scheme and path stripped. Requires a valid token, so this call can
    /// itself re-authenticate.
    pub async fn backup_api_host(
        &mut self,
        region: &str,
        use_internal: bool,
    ) -> Result<String, AuthError> {
        self.valid_token().await?;
        let region = region.to_uppercase();

        for service in self.access()?.services_named(BACKUP_SERVICE)? {
            for endpoint in &service.endpoints {
                if endpoint.region != region {
                    continue;
                }
                let (field, raw) = if use_internal {
                    ("internalURL", endpoint.internal_url.as_deref())
                } else {
                    ("publicURL", endpoint.public_url.as_deref())
                };
                let raw = raw.ok_or_else(|| AuthError::MissingField {
                    path: format!("access.serviceCatalog.{BACKUP_SERVICE}.endpoints.{field}"),
                })?;
                let url = Url::parse(raw).map_err(|e| AuthError::Configuration {
                    message: format!("invalid {field} for {BACKUP_SERVICE} in {region}: {e}"),
                })?;
                return url
                    .host_str()
                    .map(str::to_string)
                    .ok_or_else(|| AuthError::Configuration {
                        message: format!("no host in {field} for {BACKUP_SERVICE} in {region}"),
                    });
            }
        }

        Err(AuthError::Configuration {
            message: format!("no {BACKUP_SERVICE} endpoint in region {region}"),
        })
    }

    /// List the account's stored credentials.
    ///
    /// With `api_key_only` the query is scoped to the api-key credential
    /// block of the user the session was built for; otherwise every
    /// credential of the authenticated user is listed. Listing requires
    /// admin rights on the account; without them the endpoint answers 404.
    pub async fn list_credentials(&mut self, api_key_only: bool) -> Result<Value, AuthError> {
        let token = self.valid_token().await?;

        let path = if api_key_only {
            format!(
                "/v2.0/users/{}/OS-KSADM/credentials/{}",
                self.credential_user_id, APIKEY_CREDENTIALS_KEY
            )
        } else {
            format!("/v2.0/users/{}/OS-KSADM/credentials", self.user_id()?)
        };

        let request = ApiRequest::new(HttpMethod::Get, &self.identity_host, &path)
            .with_header("X-Auth-Token", &token);

        debug!(uri = %request.uri, "listing account credentials");
        let response = self.transport.send(&request).await?;
        debug!(status = response.status, "credential listing answered");

        match response.status {
            200 | 203 => {
                serde_json::from_str(&response.body).map_err(|e| AuthError::Authentication {
                    message: format!("unparseable credential listing: {e}"),
                })
            }
            404 => {
                error!("user does not have admin rights for the account");
                Err(AuthError::Authorization {
                    message: "user does not have admin rights for the account".to_string(),
                })
            }
            status => {
                error!(status, reason = %response.reason, "failed to list credentials");
                Err(AuthError::Authentication {
                    message: format!("{}: {}", status, response.body),
                })
            }
        }
    }

    fn store_response(&mut self, response: &ApiResponse) -> Result<String, AuthError> {
        let parsed: AuthResponse =
            serde_json::from_str(&response.body).map_err(|e| AuthError::Authentication {
                message: format!("unparseable identity response: {e}"),
            })?;
        self.auth_data = Some(parsed.access);
        let token = self.token_id()?.to_string();
        info!("authenticated");
        Ok(token)
    }

    fn access(&self) -> Result<&Access, AuthError> {
        self.auth_data.as_ref().ok_or_else(|| AuthError::MissingField {
            path: "access".to_string(),
        })
    }

    fn token_id(&self) -> Result<&str, AuthError> {
        self.auth_data
            .as_ref()
            .and_then(|access| access.token.as_ref())
            .and_then(|token| token.id.as_deref())
            .ok_or_else(|| AuthError::Credential {
                message: "unable to retrieve authentication token".to_string(),
            })
    }

    fn expiration_stamp(&self) -> Option<&str> {
        self.auth_data.as_ref()?.token.as_ref()?.expires.as_deref()
    }
}
