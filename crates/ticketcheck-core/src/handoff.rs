//! Result handoff: the terminal step after a submission.
//!
//! The outcome crosses the navigation boundary as a JSON string, so the
//! result screen may receive nothing, garbage, or a record. Garbage is
//! treated exactly like nothing.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{CheckInResult, Edition};
use crate::nav::{NavParams, Route};

/// Outcome plus the edition it was recorded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHandoff {
    pub result: Option<CheckInResult>,
    pub edition: Edition,
}

/// What the result screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffView {
    Success {
        name: String,
        email: String,
        ticket: String,
        edition: String,
        /// As sent by the server.
        checked_at: String,
        /// Parsed form of `checked_at`, when it is RFC 3339.
        checked_at_utc: Option<DateTime<Utc>>,
    },
    Failure {
        message: String,
    },
    NoResult,
}

impl ResultHandoff {
    pub fn new(result: Option<CheckInResult>, edition: Edition) -> Self {
        Self { result, edition }
    }

    /// Route to the result screen carrying this outcome.
    pub fn to_route(&self) -> Route {
        let result = self
            .result
            .as_ref()
            .and_then(|r| match serde_json::to_string(r) {
                Ok(json) => Some(json),
                Err(e) => {
                    warn!(error = %e, "Could not serialize check-in result");
                    None
                }
            })
            .unwrap_or_default();
        Route::Result {
            result,
            slug: self.edition.slug.clone(),
            title: self.edition.title.clone(),
        }
    }

    /// Rebuild the handoff on the result screen.
    ///
    /// `None` when the edition itself is missing; a missing or malformed
    /// `result` yields a handoff with no result.
    pub fn from_params(params: &NavParams) -> Option<Self> {
        let edition = Edition::from_params(params)?;
        let result = params
            .get("result")
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match serde_json::from_str::<CheckInResult>(raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed result payload");
                    None
                }
            });
        Some(Self { result, edition })
    }

    pub fn view(&self) -> HandoffView {
        match &self.result {
            Some(CheckInResult::Success(record)) => HandoffView::Success {
                name: record.name.clone(),
                email: record.email.clone(),
                ticket: record.ticket.clone(),
                edition: record.edition.clone(),
                checked_at: record.checked_at.clone(),
                checked_at_utc: record.checked_at_utc(),
            },
            Some(CheckInResult::Failure { error }) => HandoffView::Failure {
                message: error.clone(),
            },
            None => HandoffView::NoResult,
        }
    }

    /// Back to a freshly armed scanner for the same edition.
    pub fn scan_another(&self) -> Route {
        Route::Scanner {
            slug: self.edition.slug.clone(),
            title: self.edition.title.clone(),
        }
    }
}
