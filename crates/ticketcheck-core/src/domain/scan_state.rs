//! Scan state record and arm-cycle bookkeeping.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::check_in::CheckInRequest;

/// Identifies one arm cycle of the scan controller.
///
/// Every re-arm and every edition switch starts a new cycle, so a result
/// tagged with an older cycle can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArmCycle(pub u64);

impl ArmCycle {
    pub fn next(self) -> Self {
        ArmCycle(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for ArmCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single mutable record the scanner screen reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    /// Whether the next decoded code will be accepted.
    pub armed: bool,
    /// Code captured in the current cycle.
    pub last_code: Option<String>,
    /// User-facing error from the last submission of this cycle.
    pub error: Option<String>,
}

impl ScanState {
    /// Fresh state: armed, nothing captured, no error.
    pub fn armed() -> Self {
        Self {
            armed: true,
            last_code: None,
            error: None,
        }
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::armed()
    }
}

/// A submission the caller must send, tagged with the cycle it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheckIn {
    pub request: CheckInRequest,
    pub cycle: ArmCycle,
    /// Correlates log lines for this submission.
    pub request_id: Uuid,
}

impl PendingCheckIn {
    pub fn new(request: CheckInRequest, cycle: ArmCycle) -> Self {
        Self {
            request,
            cycle,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn edition_slug(&self) -> &str {
        &self.request.edition_slug
    }
}
