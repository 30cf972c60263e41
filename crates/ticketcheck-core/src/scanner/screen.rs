//! Scanner screen: Session Gate → Permission Gate → Scan Controller.

use tracing::Instrument;

use ticketcheck_auth::{SessionPhase, SessionStatus};

use super::controller::{DecodeOutcome, IgnoredDecode, ScanController, SubmissionOutcome};
use crate::camera::{BarcodeEvent, BarcodeFilter, CameraGate, CameraPermissions, PermissionState};
use crate::domain::{CheckInResult, Edition, PendingCheckIn, ScanResult};
use crate::gate::{PermissionGate, SessionDecision, SessionGate};
use crate::nav::{NavParams, Route};
use crate::obs;
use crate::submit::CheckInSubmitter;

/// What the scanner screen shows, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerView {
    /// No edition in the navigation params; offer edition selection.
    NoEdition,
    /// Session or permission still resolving.
    Loading,
    SignInRequired,
    /// Camera access denied; offer the retry action.
    PermissionRequired,
    Ready {
        edition: Edition,
        camera_active: bool,
        submitting: bool,
        error: Option<String>,
        can_scan_another: bool,
    },
}

/// Either a dropped decode or the applied submission outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStep {
    Ignored(IgnoredDecode),
    Completed(SubmissionOutcome),
}

#[derive(Debug, Clone)]
pub struct ScannerScreen {
    controller: ScanController,
    session: SessionGate,
    permission: PermissionGate,
    camera: CameraGate,
    filter: BarcodeFilter,
    /// Focus was dropped by a sign-in redirect, not by the caller.
    unfocused_by_redirect: bool,
}

impl ScannerScreen {
    pub fn new(edition: Option<Edition>) -> Self {
        Self {
            controller: ScanController::new(edition),
            session: SessionGate::new(),
            permission: PermissionGate::new(),
            camera: CameraGate::new(),
            filter: BarcodeFilter::qr_only(),
            unfocused_by_redirect: false,
        }
    }

    /// Enter from a route carrying `slug` and `title`.
    pub fn enter(params: &NavParams) -> Self {
        Self::new(Edition::from_params(params))
    }

    pub fn controller(&self) -> &ScanController {
        &self.controller
    }

    pub fn permission(&self) -> Option<PermissionState> {
        self.permission.state()
    }

    /// Feed the latest session status. Returns a redirect at most once per
    /// transition into absent.
    ///
    /// A redirect takes focus away from the camera; a session that comes
    /// back present gives it back, unless the caller unfocused the screen
    /// in the meantime.
    pub fn observe_session(&mut self, status: &SessionStatus) -> Option<Route> {
        match self.session.observe(status.phase()) {
            SessionDecision::Redirect(route) => {
                if self.camera.is_focused() {
                    self.camera.set_focused(false);
                    self.unfocused_by_redirect = true;
                }
                Some(route)
            }
            SessionDecision::Proceed => {
                if std::mem::take(&mut self.unfocused_by_redirect) {
                    self.camera.set_focused(true);
                }
                None
            }
            SessionDecision::Wait | SessionDecision::Blocked => None,
        }
    }

    pub async fn resolve_permission<C>(&mut self, camera: &C) -> PermissionState
    where
        C: CameraPermissions + ?Sized,
    {
        self.permission.resolve(camera).await
    }

    pub async fn retry_permission<C>(&mut self, camera: &C) -> PermissionState
    where
        C: CameraPermissions + ?Sized,
    {
        self.permission.retry(camera).await
    }

    /// Screen focus; an unfocused screen receives no frames.
    pub fn set_focused(&mut self, focused: bool) {
        self.unfocused_by_redirect = false;
        self.camera.set_focused(focused);
    }

    /// Frames flow only when the next decode would be accepted, which
    /// excludes any outstanding request, stale ones included.
    pub fn camera_active(&self) -> bool {
        self.session.is_present()
            && !self.controller.has_in_flight()
            && self
                .camera
                .is_active(self.permission.state(), self.controller.is_armed())
    }

    /// Gate a camera event and hand it to the controller.
    pub fn handle_barcode(&mut self, event: &BarcodeEvent) -> DecodeOutcome {
        let cycle = self.controller.cycle();
        let reason = if !self.filter.accepts(event) {
            Some(IgnoredDecode::Filtered)
        } else if !self.session.is_present() {
            Some(IgnoredDecode::Unauthenticated)
        } else if !self.camera.is_focused() || !self.permission.is_granted() {
            Some(IgnoredDecode::CameraInactive)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                obs::emit_decode_ignored(cycle, reason.as_str());
                DecodeOutcome::Ignored(reason)
            }
            None => self.controller.on_decode(&event.data),
        }
    }

    pub fn complete(&mut self, pending: &PendingCheckIn, result: CheckInResult) -> SubmissionOutcome {
        self.controller.on_submission(pending, result)
    }

    /// Decode, submit and apply in one step.
    ///
    /// Holds the screen for the whole round trip, so callers that must keep
    /// receiving events during the request should use [`Self::handle_barcode`]
    /// and [`Self::complete`] instead.
    pub async fn scan<S>(&mut self, event: &BarcodeEvent, submitter: &S) -> ScanStep
    where
        S: CheckInSubmitter + ?Sized,
    {
        match self.handle_barcode(event) {
            DecodeOutcome::Ignored(reason) => ScanStep::Ignored(reason),
            DecodeOutcome::Submit(pending) => {
                obs::emit_check_in_submitted(&pending);
                let result = submitter
                    .submit(&pending.request)
                    .instrument(obs::check_in_span(&pending))
                    .await;
                ScanStep::Completed(self.complete(&pending, result))
            }
        }
    }

    pub fn scan_another(&mut self) -> ScanResult<()> {
        self.controller.scan_another()
    }

    pub fn select_edition(&mut self, edition: Edition) -> ScanResult<()> {
        self.controller.select_edition(edition)
    }

    pub fn switch_edition(&mut self) -> Route {
        self.controller.switch_edition()
    }

    pub fn view(&self) -> ScannerView {
        let Some(edition) = self.controller.edition() else {
            return ScannerView::NoEdition;
        };
        match (self.session.phase(), self.permission.state()) {
            (None | Some(SessionPhase::Pending), _) | (_, None) => ScannerView::Loading,
            (Some(SessionPhase::Absent), _) => ScannerView::SignInRequired,
            (Some(SessionPhase::Present), Some(state)) if !state.is_granted() => {
                ScannerView::PermissionRequired
            }
            (Some(SessionPhase::Present), Some(_)) => ScannerView::Ready {
                edition: edition.clone(),
                camera_active: self.camera_active(),
                submitting: self.controller.has_in_flight(),
                error: self.controller.state().error.clone(),
                can_scan_another: self.controller.phase() == super::ScanPhase::Scanned,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{staff_session, RecordingSubmitter, ScriptedCamera};
    use crate::camera::BarcodeKind;

    async fn ready_screen() -> ScannerScreen {
        let mut screen = ScannerScreen::new(Some(Edition::new("iw3-2025", "IW3 2025")));
        screen.session.observe(SessionPhase::Present);
        screen
            .resolve_permission(&ScriptedCamera::new(PermissionState::Granted))
            .await;
        screen
    }

    #[test]
    fn test_no_edition_view_wins() {
        let screen = ScannerScreen::enter(&NavParams::new());
        assert_eq!(screen.view(), ScannerView::NoEdition);
    }

    #[test]
    fn test_loading_until_session_and_permission_known() {
        let mut screen = ScannerScreen::new(Some(Edition::new("iw3-2025", "IW3 2025")));
        assert_eq!(screen.view(), ScannerView::Loading);
        screen.observe_session(&SessionStatus::Pending);
        assert_eq!(screen.view(), ScannerView::Loading);
    }

    #[tokio::test]
    async fn test_denied_permission_view() {
        let mut screen = ScannerScreen::new(Some(Edition::new("iw3-2025", "IW3 2025")));
        screen.session.observe(SessionPhase::Present);
        screen
            .resolve_permission(&ScriptedCamera::new(PermissionState::Denied))
            .await;
        assert_eq!(screen.view(), ScannerView::PermissionRequired);
    }

    #[tokio::test]
    async fn test_non_qr_never_reaches_submitter() {
        let mut screen = ready_screen().await;
        let submitter = RecordingSubmitter::new();
        let event = BarcodeEvent {
            kind: BarcodeKind::Ean13,
            data: "4006381333931".into(),
        };
        assert_eq!(
            screen.scan(&event, &submitter).await,
            ScanStep::Ignored(IgnoredDecode::Filtered)
        );
        assert_eq!(submitter.call_count(), 0);
        assert!(screen.controller().is_armed());
    }

    #[tokio::test]
    async fn test_unfocused_screen_drops_frames() {
        let mut screen = ready_screen().await;
        screen.set_focused(false);
        assert!(!screen.camera_active());
        assert_eq!(
            screen.handle_barcode(&BarcodeEvent::qr("PART-1")),
            DecodeOutcome::Ignored(IgnoredDecode::CameraInactive)
        );
    }

    #[tokio::test]
    async fn test_focus_returns_when_session_comes_back() {
        let mut screen = ready_screen().await;
        assert_eq!(screen.observe_session(&SessionStatus::Absent), Some(Route::SignIn));
        assert!(!screen.camera_active());

        assert_eq!(screen.observe_session(&staff_session()), None);
        assert!(screen.camera_active());
        assert!(matches!(
            screen.handle_barcode(&BarcodeEvent::qr("PART-1")),
            DecodeOutcome::Submit(_)
        ));
    }

    #[tokio::test]
    async fn test_caller_unfocus_survives_session_changes() {
        let mut screen = ready_screen().await;
        screen.set_focused(false);
        screen.observe_session(&SessionStatus::Absent);
        screen.observe_session(&staff_session());
        assert!(!screen.camera_active());
    }

    #[tokio::test]
    async fn test_camera_inactive_while_stale_request_outstanding() {
        let mut screen = ready_screen().await;
        let DecodeOutcome::Submit(pending) = screen.handle_barcode(&BarcodeEvent::qr("PART-1"))
        else {
            panic!("expected submission");
        };
        screen.switch_edition();
        screen
            .select_edition(Edition::new("iw3-2026", "IW3 2026"))
            .unwrap();

        match screen.view() {
            ScannerView::Ready {
                camera_active,
                submitting,
                ..
            } => {
                assert!(!camera_active);
                assert!(submitting);
            }
            other => panic!("unexpected view: {other:?}"),
        }

        screen.complete(&pending, CheckInResult::generic_failure());
        assert!(screen.camera_active());
    }

    #[tokio::test]
    async fn test_ready_view_reflects_failure() {
        let mut screen = ready_screen().await;
        let submitter = RecordingSubmitter::with_results([CheckInResult::failure("unknown participant")]);
        screen.scan(&BarcodeEvent::qr("PART-404"), &submitter).await;

        match screen.view() {
            ScannerView::Ready {
                camera_active,
                submitting,
                error,
                can_scan_another,
                ..
            } => {
                assert!(!camera_active);
                assert!(!submitting);
                assert_eq!(error.as_deref(), Some("unknown participant"));
                assert!(can_scan_another);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }
}
