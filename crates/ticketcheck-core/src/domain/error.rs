//! Error taxonomy for the check-in core.

/// Transitions the scan controller refuses.
///
/// These are caller mistakes (a button pressed in the wrong state), not
/// submission failures; submission failures live in `ScanState::error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("an edition is already selected: {0}")]
    EditionAlreadySelected(String),

    #[error("a check-in is already in flight for this cycle")]
    SubmissionInFlight,

    #[error("nothing scanned yet in this cycle")]
    NotScanned,
}

/// Configuration problems detected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Result type for scan controller transitions.
pub type ScanResult<T> = std::result::Result<T, ScanError>;
