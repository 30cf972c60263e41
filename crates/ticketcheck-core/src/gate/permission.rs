//! Camera permission gate.

use tracing::warn;

use crate::camera::{CameraPermissions, PermissionState};
use crate::obs;

/// Resolves camera access before the scan controller is enabled.
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    state: Option<PermissionState>,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the platform has been queried.
    pub fn state(&self) -> Option<PermissionState> {
        self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state.is_some_and(PermissionState::is_granted)
    }

    /// Query the platform and, when undetermined, issue exactly one request.
    ///
    /// Once the state is determined this makes no further platform calls.
    /// Platform errors are logged and recorded as `Denied`.
    pub async fn resolve<C>(&mut self, camera: &C) -> PermissionState
    where
        C: CameraPermissions + ?Sized,
    {
        if let Some(state) = self.state.filter(|s| *s != PermissionState::Undetermined) {
            return state;
        }

        let current = match camera.status().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Camera permission query failed");
                PermissionState::Undetermined
            }
        };

        let resolved = match current {
            PermissionState::Undetermined => self.request(camera).await,
            determined => determined,
        };
        self.state = Some(resolved);
        resolved
    }

    /// Re-issue the permission request after a denial.
    ///
    /// Safe to call in any state; never fails. Granted stays granted
    /// without prompting again.
    pub async fn retry<C>(&mut self, camera: &C) -> PermissionState
    where
        C: CameraPermissions + ?Sized,
    {
        if self.is_granted() {
            return PermissionState::Granted;
        }
        let resolved = self.request(camera).await;
        self.state = Some(resolved);
        resolved
    }

    async fn request<C>(&self, camera: &C) -> PermissionState
    where
        C: CameraPermissions + ?Sized,
    {
        obs::emit_permission_requested();
        match camera.request().await {
            Ok(PermissionState::Undetermined) => PermissionState::Denied,
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Camera permission request failed");
                PermissionState::Denied
            }
        }
    }
}
