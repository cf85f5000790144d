//! Connection settings for `AndonClient`.

use std::fmt;

use crate::error::AndonError;

/// Base URL of the public Andon API.
pub const DEFAULT_ENDPOINT: &str = "https://portal.andonapp.com/public/api/v1/";

pub const ORG_NAME_ENV: &str = "ANDON_ORG_NAME";
pub const API_TOKEN_ENV: &str = "ANDON_API_TOKEN";
pub const ENDPOINT_ENV: &str = "ANDON_ENDPOINT";

/// Organization, credential and optional endpoint for a client.
///
/// The API token is generated on the organization settings page in Andon.
#[derive(Clone)]
pub struct ClientConfig {
    pub org_name: String,
    pub api_token: String,
    /// Replaces `DEFAULT_ENDPOINT` when set.
    pub endpoint: Option<String>,
}

impl ClientConfig {
    pub fn new(org_name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            api_token: api_token.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Read `ANDON_ORG_NAME`, `ANDON_API_TOKEN` and the optional `ANDON_ENDPOINT`.
    pub fn from_env() -> Result<Self, AndonError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AndonError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AndonError::InvalidArgument(format!("{key} is not set")))
        };

        let mut config = Self::new(required(ORG_NAME_ENV)?, required(API_TOKEN_ENV)?);
        config.endpoint = lookup(ENDPOINT_ENV).filter(|value| !value.trim().is_empty());
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("org_name", &self.org_name)
            .field("api_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_required_and_optional_vars() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ORG_NAME_ENV, "Test Org"),
            (API_TOKEN_ENV, "api-token"),
            (ENDPOINT_ENV, "http://localhost:8080/public/api/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.org_name, "Test Org");
        assert_eq!(config.api_token, "api-token");
        assert_eq!(
            config.endpoint.as_deref(),
            Some("http://localhost:8080/public/api/v1/")
        );
    }

    #[test]
    fn endpoint_is_optional() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ORG_NAME_ENV, "Test Org"),
            (API_TOKEN_ENV, "api-token"),
        ]))
        .unwrap();
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn missing_token_is_invalid_argument() {
        let err = ClientConfig::from_lookup(lookup(&[(ORG_NAME_ENV, "Test Org")])).unwrap_err();
        assert!(matches!(err, AndonError::InvalidArgument(msg) if msg.contains(API_TOKEN_ENV)));
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::new("Test Org", "secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("Test Org"));
    }
}
