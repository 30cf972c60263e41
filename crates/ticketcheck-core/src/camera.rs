//! Camera collaborator interface.
//!
//! The device camera is external. The core sees it through three things:
//! permission query/request ([`CameraPermissions`]), decoded barcode events
//! ([`BarcodeEvent`]) and a visibility flag ([`CameraGate`]) deciding
//! whether frames are being supplied at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Undetermined,
    Denied,
    Granted,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Error reported by the platform permission API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("camera permission API failed: {0}")]
pub struct PermissionApiError(pub String);

/// Platform camera-permission API.
#[async_trait]
pub trait CameraPermissions: Send + Sync {
    async fn status(&self) -> Result<PermissionState, PermissionApiError>;

    /// Prompt the user. Resolves with the state after the prompt closes.
    async fn request(&self) -> Result<PermissionState, PermissionApiError>;
}

/// Symbology of a decoded barcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeKind {
    Qr,
    Ean13,
    Code128,
    Other(String),
}

impl BarcodeKind {
    /// Parse a symbology name as reported by scanners (`qr`, `ean13`, ...).
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "qr" | "qrcode" | "qr_code" => BarcodeKind::Qr,
            "ean13" | "ean-13" => BarcodeKind::Ean13,
            "code128" | "code-128" => BarcodeKind::Code128,
            other => BarcodeKind::Other(other.to_string()),
        }
    }
}

/// One decoded code delivered by the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeEvent {
    pub kind: BarcodeKind,
    pub data: String,
}

impl BarcodeEvent {
    pub fn qr(data: impl Into<String>) -> Self {
        Self {
            kind: BarcodeKind::Qr,
            data: data.into(),
        }
    }
}

/// Which symbologies reach the scan controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeFilter {
    kinds: Vec<BarcodeKind>,
}

impl BarcodeFilter {
    pub fn qr_only() -> Self {
        Self {
            kinds: vec![BarcodeKind::Qr],
        }
    }

    pub fn accepts(&self, event: &BarcodeEvent) -> bool {
        self.kinds.contains(&event.kind)
    }
}

impl Default for BarcodeFilter {
    fn default() -> Self {
        Self::qr_only()
    }
}

/// Decides whether the camera is supplying frames.
///
/// Only one consumer may use the camera at a time. Ownership is expressed
/// by the screen's focus flag, not a lock: an unfocused screen never
/// receives frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraGate {
    focused: bool,
}

impl CameraGate {
    pub fn new() -> Self {
        Self { focused: true }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Frames flow only when focused, permitted and armed.
    pub fn is_active(&self, permission: Option<PermissionState>, armed: bool) -> bool {
        self.focused && armed && permission.is_some_and(PermissionState::is_granted)
    }
}

impl Default for CameraGate {
    fn default() -> Self {
        Self::new()
    }
}
