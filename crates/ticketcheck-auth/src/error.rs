//! Error types for ticketcheck-auth

use thiserror::Error;

/// Errors that can occur while talking to the auth server
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server refused the request
    #[error("Auth server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Unexpected auth response: {0}")]
    Decode(String),

    /// Configuration could not be used to build a client
    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Decode(err.to_string())
        } else {
            AuthError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Decode(err.to_string())
    }
}
