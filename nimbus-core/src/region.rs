//! Datacenter to identity-API host resolution.

use crate::error::AuthError;

/// Hostname of the shared identity endpoint.
const IDENTITY_API_HOST: &str = "identity.api.nimbuscloud.com";

/// Resolve a datacenter code to the identity API host serving it.
///
/// Most datacenters share the global identity endpoint; `hkg` and `syd`
/// are served by dedicated regional endpoints. Codes are expected in
/// lowercase, matching the API documentation.
pub fn identity_api_host(datacenter: &str) -> Result<String, AuthError> {
    match datacenter {
        "us" | "uk" | "lon" | "iad" | "dfw" | "ord" => Ok(IDENTITY_API_HOST.to_string()),
        "hkg" | "syd" => Ok(format!("{datacenter}.{IDENTITY_API_HOST}")),
        other => Err(AuthError::Configuration {
            message: format!("unknown datacenter: {other}"),
        }),
    }
}
