//! Scan lifecycle: the controller state machine and the screen that gates it.

pub mod controller;
pub mod screen;

pub use controller::{DecodeOutcome, IgnoredDecode, ScanController, ScanPhase, SubmissionOutcome};
pub use screen::{ScanStep, ScannerScreen, ScannerView};
