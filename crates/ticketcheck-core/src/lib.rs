//! ticketcheck-core: scan-to-check-in for event staff
//!
//! Staff pick an edition, point the camera at an attendee's QR code, and
//! the participant is checked in exactly once. This crate holds the state
//! machine and everything it needs:
//!
//! - [`gate`]: session and camera-permission gates
//! - [`scanner`]: the [`ScanController`] and the [`ScannerScreen`] around it
//! - [`submit`]: the [`CheckInSubmitter`] seam and its HTTP implementation
//! - [`handoff`]: the outcome passed to the result screen
//! - [`editions`]: the edition calendar and selection screen
//!
//! ## Layer 1 - Check-in
//!
//! Authentication comes from `ticketcheck-auth` (layer 0) through the
//! `SessionSource` and `CredentialSource` traits.

pub mod api;
pub mod camera;
pub mod config;
pub mod domain;
pub mod editions;
pub mod fakes;
pub mod gate;
pub mod handoff;
pub mod nav;
pub mod obs;
pub mod scanner;
pub mod submit;
pub mod telemetry;

pub use api::{ApiClient, ApiError};

pub use camera::{
    BarcodeEvent, BarcodeFilter, BarcodeKind, CameraGate, CameraPermissions, PermissionApiError,
    PermissionState,
};

pub use config::ClientConfig;

pub use domain::{
    ArmCycle, CheckInRecord, CheckInRequest, CheckInResult, ConfigError, Edition, EditionListing,
    PendingCheckIn, ScanError, ScanResult, ScanState, GENERIC_FAILURE,
};

pub use editions::{EditionSelect, EditionSelectView, EditionsClient, FetchState};

pub use gate::{PermissionGate, SessionDecision, SessionGate};

pub use handoff::{HandoffView, ResultHandoff};

pub use nav::{NavParams, Route, SignInScreen};

pub use scanner::{
    DecodeOutcome, IgnoredDecode, ScanController, ScanPhase, ScanStep, ScannerScreen,
    ScannerView, SubmissionOutcome,
};

pub use submit::{CheckInSubmitter, HttpCheckInSubmitter};

pub use telemetry::init_tracing;
