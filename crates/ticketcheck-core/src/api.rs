//! JSON-over-HTTP helper for the ticketing API.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::ConfigError;

/// Errors produced by [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure; no response was received.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx response. `info` is the decoded JSON body, `Null` if the
    /// body was not JSON.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        info: Value,
    },

    /// 2xx response whose body did not match the expected type.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// The `error` string carried by a non-2xx JSON body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { info, .. } => info.get("error").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin wrapper over `reqwest::Client` rooted at the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                url: config.api_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(method = "GET", url = %url, "API request");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        decode(url, response).await
    }

    /// POST a JSON body, sending `cookie` as the `Cookie` header when present.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        cookie: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(method = "POST", url = %url, authenticated = cookie.is_some(), "API request");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| ApiError::Transport {
                url: url.clone(),
                message: format!("invalid cookie header: {e}"),
            })?;
            headers.insert(COOKIE, value);
        }

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        decode(url, response).await
    }
}

fn transport(url: &str, err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(url: String, response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| transport(&url, e))?;

    if !status.is_success() {
        let info = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        return Err(ApiError::Status {
            url,
            status: status.as_u16(),
            info,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
        url,
        message: e.to_string(),
    })
}
