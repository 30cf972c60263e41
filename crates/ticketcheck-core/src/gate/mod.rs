//! Gates that must pass before the scan controller accepts events.
//!
//! - [`SessionGate`]: a valid authenticated identity exists
//! - [`PermissionGate`]: camera access is granted

pub mod permission;
pub mod session;

pub use permission::PermissionGate;
pub use session::{SessionDecision, SessionGate};
