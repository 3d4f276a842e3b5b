//! Wire-format types for the identity API response envelope.
//!
//! `POST /v2.0/tokens` answers with an `access` envelope carrying the issued
//! token, the owning tenant and user, and the service catalog. Fields the
//! accessors tolerate missing are modeled as `Option` so their absence can
//! surface as [`AuthError`](crate::error::AuthError) values naming the
//! absent key chain instead of failing the whole parse.

use serde::Deserialize;

use crate::error::AuthError;

/// Top-level response document for `POST /v2.0/tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access: Access,
}

/// The `access` envelope of a successful authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub token: Option<TokenData>,
    pub tenant: Option<TenantData>,
    pub user: Option<UserData>,
    /// Absent is distinct from empty: a response without the key fails
    /// catalog traversal, an empty list just yields nothing.
    pub service_catalog: Option<Vec<CatalogService>>,
}

/// The issued token and its expiration stamp.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    pub id: Option<String>,
    pub expires: Option<String>,
}

/// The tenant the token was issued for.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantData {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// The authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub id: Option<String>,
}

/// One service catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogService {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// One regional endpoint of a catalog service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default)]
    pub region: String,
    #[serde(rename = "publicURL")]
    pub public_url: Option<String>,
    #[serde(rename = "internalURL")]
    pub internal_url: Option<String>,
    #[serde(default)]
    pub tenant_id: String,
}

impl Access {
    /// The service catalog, or [`AuthError::MissingField`] when the key is
    /// absent from the response.
    pub fn catalog(&self) -> Result<&[CatalogService], AuthError> {
        self.service_catalog
            .as_deref()
            .ok_or_else(|| AuthError::MissingField {
                path: "access.serviceCatalog".to_string(),
            })
    }

    /// Every catalog entry named `service_name`, in catalog order.
    ///
    /// The catalog may legitimately carry several entries under one name;
    /// callers that scan endpoints must walk all of them.
    pub fn services_named<'a>(
        &'a self,
        service_name: &'a str,
    ) -> Result<impl Iterator<Item = &'a CatalogService>, AuthError> {
        Ok(self
            .catalog()?
            .iter()
            .filter(move |service| service.name == service_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{
        "access": {
            "token": {"id": "tok-123", "expires": "2026-08-06T14:02:26.550Z"},
            "tenant": {"id": "111222", "name": "acme"},
            "user": {"id": "9001"},
            "serviceCatalog": [
                {
                    "name": "cloudFiles",
                    "endpoints": [
                        {
                            "region": "DFW",
                            "publicURL": "https://storage.dfw.nimbuscloud.com/v1/acct",
                            "internalURL": "https://snet-storage.dfw.nimbuscloud.com/v1/acct",
                            "tenantId": "Files_111222"
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_parses_full_envelope() {
        let response: AuthResponse = serde_json::from_str(ENVELOPE).unwrap();
        let access = response.access;
        assert_eq!(access.token.as_ref().unwrap().id.as_deref(), Some("tok-123"));
        assert_eq!(access.tenant.as_ref().unwrap().name.as_deref(), Some("acme"));
        assert_eq!(access.user.as_ref().unwrap().id.as_deref(), Some("9001"));

        let catalog = access.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        let endpoint = &catalog[0].endpoints[0];
        assert_eq!(endpoint.region, "DFW");
        assert_eq!(endpoint.tenant_id, "Files_111222");
        assert!(endpoint.internal_url.as_deref().unwrap().contains("snet"));
    }

    #[test]
    fn test_sparse_envelope_still_parses() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"access": {"token": {"id": "tok-123"}}}"#).unwrap();
        let access = response.access;
        assert!(access.token.as_ref().unwrap().expires.is_none());
        assert!(access.tenant.is_none());
        assert!(access.user.is_none());
    }

    #[test]
    fn test_absent_catalog_is_a_missing_field() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"access": {"token": {"id": "tok-123"}}}"#).unwrap();
        match response.access.catalog() {
            Err(AuthError::MissingField { path }) => assert_eq!(path, "access.serviceCatalog"),
            other => panic!("expected AuthError::MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_catalog_is_not_missing() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"access": {"serviceCatalog": []}}"#).unwrap();
        assert!(response.access.catalog().unwrap().is_empty());
        assert_eq!(response.access.services_named("cloudFiles").unwrap().count(), 0);
    }

    #[test]
    fn test_services_named_filters_in_order() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"access": {"serviceCatalog": [
                {"name": "cloudFiles", "endpoints": [{"region": "DFW"}]},
                {"name": "cloudBackup", "endpoints": [{"region": "DFW"}]},
                {"name": "cloudFiles", "endpoints": [{"region": "ORD"}]}
            ]}}"#,
        )
        .unwrap();

        let regions: Vec<_> = response
            .access
            .services_named("cloudFiles")
            .unwrap()
            .flat_map(|service| service.endpoints.iter().map(|e| e.region.as_str()))
            .collect();
        assert_eq!(regions, ["DFW", "ORD"]);
    }
}
