//! Client configuration
//!
//! Environment variables:
//! - `TICKETCHECK_BACKEND_URL` (optional, default: `http://localhost:3000`)
//! - `TICKETCHECK_API_URL` (optional, default: `{backend}/api`)
//! - `TICKETCHECK_TIMEOUT_SECS` (optional, default: 15)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketcheck_auth::AuthConfig;
use tracing::warn;

use crate::domain::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = ticketcheck_auth::config::DEFAULT_BACKEND_URL;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Endpoints and transport settings shared by every API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Auth server URL
    pub backend_url: String,
    /// Ticketing API base URL (`/check-in`, `/trpc/...` hang off it)
    pub api_url: String,
    /// Upper bound on every request; guarantees each submission resolves.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let backend_url = std::env::var("TICKETCHECK_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let api_url = std::env::var("TICKETCHECK_API_URL")
            .unwrap_or_else(|_| default_api_url(&backend_url));
        let timeout = match std::env::var("TICKETCHECK_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring invalid TICKETCHECK_TIMEOUT_SECS");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        ClientConfig {
            backend_url: trim_url(&backend_url),
            api_url: trim_url(&api_url),
            timeout: Duration::from_secs(timeout),
            user_agent: format!("ticketcheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for explicit endpoints
    pub fn new(backend_url: &str, api_url: &str) -> Self {
        ClientConfig {
            backend_url: trim_url(backend_url),
            api_url: trim_url(api_url),
            ..Self::default()
        }
    }

    /// Override the backend URL; the API URL follows unless set explicitly.
    pub fn with_backend(backend_url: &str) -> Self {
        Self::new(backend_url, &default_api_url(backend_url))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("backend_url", &self.backend_url), ("api_url", &self.api_url)] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("must be non-zero".into()));
        }
        Ok(())
    }

    /// Matching configuration for the auth collaborator.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(&self.backend_url).with_timeout(self.timeout)
    }
}

fn default_api_url(backend_url: &str) -> String {
    format!("{}/api", trim_url(backend_url))
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = ClientConfig::new("https://tickets.iw3.fr/", "https://api.iw3.fr/v1/");
        assert_eq!(config.backend_url, "https://tickets.iw3.fr");
        assert_eq!(config.api_url, "https://api.iw3.fr/v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_backend_derives_api_url() {
        let config = ClientConfig::with_backend("https://tickets.iw3.fr");
        assert_eq!(config.api_url, "https://tickets.iw3.fr/api");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ClientConfig::new("https://tickets.iw3.fr", "tickets.iw3.fr/api");
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "api_url",
                value: "tickets.iw3.fr/api".into(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::with_backend("http://localhost:3000").with_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_auth_config_shares_backend_and_timeout() {
        let config = ClientConfig::with_backend("https://tickets.iw3.fr")
            .with_timeout(Duration::from_secs(3));
        let auth = config.auth_config();
        assert_eq!(auth.base_url, "https://tickets.iw3.fr");
        assert_eq!(auth.timeout, Duration::from_secs(3));
    }
}
