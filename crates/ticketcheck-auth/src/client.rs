//! better-auth HTTP client
//!
//! Wraps the four auth routes the check-in client needs:
//! `get-session`, `sign-in/email`, `sign-in/social` and `sign-out`.
//! Session cookies received from the server are kept in a [`CookieJar`]
//! for the lifetime of the client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, COOKIE, ORIGIN, SET_COOKIE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::AuthConfig;
use crate::credentials::{CookieJar, CredentialSource};
use crate::error::AuthError;
use crate::session::{Session, SessionSource, SessionStatus};
use crate::Result;

/// Where to send the user to finish a social sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialRedirect {
    pub url: String,
    #[serde(default)]
    pub redirect: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Auth client for session operations
pub struct AuthClient {
    config: AuthConfig,
    http_client: reqwest::Client,
    jar: CookieJar,
}

impl AuthClient {
    /// Create a new auth client with an empty cookie jar
    pub fn new(config: AuthConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(AuthClient {
            config,
            http_client,
            jar: CookieJar::new(),
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(AuthConfig::from_env())
    }

    /// Seed the jar with a previously issued cookie header
    pub fn with_cookie(self, header: &str) -> Self {
        AuthClient {
            jar: CookieJar::from_header(header),
            ..self
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Resolve the current session.
    ///
    /// Never fails: an unreachable server leaves the status `Pending` so
    /// callers keep waiting instead of bouncing the user to sign-in.
    #[instrument(skip_all)]
    pub async fn get_session(&self) -> SessionStatus {
        let Some(cookie) = self.jar.cookie_header() else {
            debug!("No session cookie, session absent");
            return SessionStatus::Absent;
        };

        let response = match self
            .http_client
            .get(self.config.endpoint("/get-session"))
            .header(COOKIE, cookie)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                return SessionStatus::Pending;
            }
        };

        let status = response.status();
        self.absorb_cookies(response.headers());

        if status == StatusCode::UNAUTHORIZED {
            return SessionStatus::Absent;
        }
        if !status.is_success() {
            warn!("Session lookup returned {}", status);
            return SessionStatus::Pending;
        }

        match response.json::<Option<Session>>().await {
            Ok(Some(session)) => SessionStatus::Present(Box::new(session)),
            Ok(None) => SessionStatus::Absent,
            Err(e) => {
                warn!("Session payload could not be decoded: {}", e);
                SessionStatus::Pending
            }
        }
    }

    /// Sign in with email and password, storing the session cookie
    #[instrument(skip_all, fields(email = %email))]
    pub async fn sign_in_with_credentials(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http_client
            .post(self.config.endpoint("/sign-in/email"))
            .header(ORIGIN, self.config.base_url.as_str())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        self.absorb_cookies(response.headers());
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }

        info!("Signed in");
        match self.get_session().await {
            SessionStatus::Present(session) => Ok(*session),
            SessionStatus::Absent => Err(AuthError::Decode(
                "sign-in succeeded but no session cookie was issued".to_string(),
            )),
            SessionStatus::Pending => Err(AuthError::Http(
                "sign-in succeeded but the session could not be resolved".to_string(),
            )),
        }
    }

    /// Start a social sign-in and return the provider URL
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn sign_in_with_provider(
        &self,
        provider: &str,
        callback_url: &str,
    ) -> Result<SocialRedirect> {
        let response = self
            .http_client
            .post(self.config.endpoint("/sign-in/social"))
            .header(ORIGIN, self.config.base_url.as_str())
            .json(&json!({ "provider": provider, "callbackURL": callback_url }))
            .send()
            .await?;

        let status = response.status();
        self.absorb_cookies(response.headers());
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }

        Ok(response.json::<SocialRedirect>().await?)
    }

    /// Sign out. The local cookie is cleared even if the server call fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<()> {
        let cookie = self.jar.cookie_header();
        self.jar.clear();

        let Some(cookie) = cookie else {
            debug!("Sign-out without a session cookie");
            return Ok(());
        };

        let response = self
            .http_client
            .post(self.config.endpoint("/sign-out"))
            .header(ORIGIN, self.config.base_url.as_str())
            .header(COOKIE, cookie)
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }
        info!("Signed out");
        Ok(())
    }

    fn absorb_cookies(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            match value.to_str() {
                Ok(raw) => self.jar.store(raw),
                Err(_) => warn!("Ignoring non-ASCII Set-Cookie header"),
            }
        }
    }
}

impl CredentialSource for AuthClient {
    fn cookie_header(&self) -> Option<String> {
        self.jar.cookie_header()
    }
}

#[async_trait]
impl SessionSource for AuthClient {
    async fn session_status(&self) -> SessionStatus {
        self.get_session().await
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> AuthError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.code))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    AuthError::Rejected {
        status: status.as_u16(),
        message,
    }
}
