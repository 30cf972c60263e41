//! Auth server configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::Result;

/// Default auth server when `TICKETCHECK_BACKEND_URL` is not set
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// Path prefix under which better-auth mounts its routes
pub const AUTH_PREFIX: &str = "/api/auth";

/// Auth client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Auth server URL (scheme + host, no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            base_url: std::env::var("TICKETCHECK_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            timeout: Duration::from_secs(15),
            user_agent: format!("ticketcheck-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AuthConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific server
    pub fn new(base_url: &str) -> Self {
        AuthConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL of an auth route, e.g. `endpoint("/get-session")`
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            AUTH_PREFIX,
            route
        )
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AuthError::InvalidConfig(format!(
                "backend URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(AuthError::InvalidConfig("timeout must be non-zero".into()));
        }
        Ok(())
    }
}
