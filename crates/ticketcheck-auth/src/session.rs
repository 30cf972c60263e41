//! Session and user types returned by the auth server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user as returned by `get-session` and `sign-in/email`.
///
/// better-auth core fields are camelCase; the profile extensions added by the
/// ticketing backend (`first_name`, `last_name`, ...) are snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: bool,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socials: Option<BTreeMap<String, String>>,
}

/// Server-side session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A resolved session: the server record plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session: SessionInfo,
    pub user: User,
}

impl Session {
    /// Whether the session has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.session.expires_at
    }
}

/// Three-phase projection of session resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Resolution has not completed yet.
    Pending,
    /// No valid session exists.
    Absent,
    /// A valid session exists.
    Present,
}

/// Current session resolution state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Absent,
    Present(Box<Session>),
}

impl SessionStatus {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionStatus::Pending => SessionPhase::Pending,
            SessionStatus::Absent => SessionPhase::Absent,
            SessionStatus::Present(_) => SessionPhase::Present,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionStatus::Present(session) => Some(session),
            _ => None,
        }
    }
}

/// Anything that can resolve the current session.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn session_status(&self) -> SessionStatus;
}
