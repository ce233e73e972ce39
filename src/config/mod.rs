//! Connection configuration for the adapter
//!
//! The domain string doubles as the connection identity: the schema cache is
//! keyed by it and a cached schema never serves a differing domain.

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterResult};

/// Configuration for one CRM connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host the deployment is reachable at, e.g. `crm.example.com`
    pub domain: String,
    /// API key presented as a bearer token
    pub api_key: String,
    /// Timeout for API calls in seconds
    pub timeout_seconds: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            api_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl ConnectionConfig {
    /// Validate that the configuration can be used to reach a deployment.
    pub fn validate(&self) -> AdapterResult<()> {
        if self.domain.trim().is_empty() {
            return Err(AdapterError::MalformedInput(
                "connection domain must not be empty".to_string(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(AdapterError::Authentication(
                "connection API key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn base_url(&self) -> String {
        if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            self.domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.domain.trim_end_matches('/'))
        }
    }

    /// URL of the object/field metadata API.
    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.base_url())
    }

    /// URL of the GraphQL data API.
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url())
    }

    /// URL of a REST data API path.
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = ConnectionConfig::default();
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            domain: "crm.example.com".to_string(),
            api_key: "key".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ConnectionConfig {
            domain: "crm.example.com".to_string(),
            api_key: "key".to_string(),
            ..Default::default()
        };
        assert_eq!(config.metadata_url(), "https://crm.example.com/metadata");
        assert_eq!(config.graphql_url(), "https://crm.example.com/graphql");
        assert_eq!(
            config.rest_url("/companies/abc"),
            "https://crm.example.com/rest/companies/abc"
        );
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let config = ConnectionConfig {
            domain: "http://localhost:3000/".to_string(),
            api_key: "key".to_string(),
            ..Default::default()
        };
        assert_eq!(config.graphql_url(), "http://localhost:3000/graphql");
    }
}
