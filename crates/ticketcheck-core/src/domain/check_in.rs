//! Check-in wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message surfaced when the server gives no usable error string.
pub const GENERIC_FAILURE: &str = "An error occurred while fetching the data.";

/// Body of `POST /check-in`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub participant_id: String,
    pub edition_slug: String,
}

/// Attendance record returned by the check-in endpoint on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub ticket: String,
    pub edition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub checked_at: String,
    pub is_checked_in: bool,
}

impl CheckInRecord {
    /// `checked_at` parsed as RFC 3339, when the server sent one.
    pub fn checked_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.checked_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Outcome of one check-in submission.
///
/// Any object carrying an `error` key is a failure, so `Failure` is tried
/// first when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckInResult {
    Failure { error: String },
    Success(CheckInRecord),
}

impl CheckInResult {
    pub fn failure(message: impl Into<String>) -> Self {
        CheckInResult::Failure {
            error: message.into(),
        }
    }

    pub fn generic_failure() -> Self {
        Self::failure(GENERIC_FAILURE)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CheckInResult::Success(_))
    }

    pub fn record(&self) -> Option<&CheckInRecord> {
        match self {
            CheckInResult::Success(record) => Some(record),
            CheckInResult::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CheckInResult::Failure { error } => Some(error),
            CheckInResult::Success(_) => None,
        }
    }
}
