//! Domain types for the check-in core.

pub mod check_in;
pub mod edition;
pub mod error;
pub mod scan_state;

pub use check_in::{CheckInRecord, CheckInRequest, CheckInResult, GENERIC_FAILURE};
pub use edition::{Edition, EditionListing};
pub use error::{ConfigError, ScanError, ScanResult};
pub use scan_state::{ArmCycle, PendingCheckIn, ScanState};
