//! Scan controller: the scan-to-check-in state machine.
//!
//! ```text
//!                 select_edition
//! NoEditionSelected ───────────▶ AwaitingFrame ◀──────────────┐
//!        ▲                            │ on_decode             │ scan_another
//!        │ switch_edition             ▼                       │
//!        └───────────────────── Submitting ──on_submission──▶ Scanned
//!                                                 (success: handoff,
//!                                                  failure: error set)
//! ```
//!
//! All transitions are synchronous. `on_decode` latches `armed = false`
//! before it returns the [`PendingCheckIn`], so the disarm always
//! happens-before the caller starts the network request. A second decode
//! can never produce a second request while one is outstanding, even across
//! an edition switch: the in-flight latch is released only when the tagged
//! result comes back.
//!
//! Each cycle owns an [`ArmCycleSpan`]; transitions run inside it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    ArmCycle, CheckInRequest, CheckInResult, Edition, PendingCheckIn, ScanError, ScanResult,
    ScanState,
};
use crate::handoff::ResultHandoff;
use crate::nav::Route;
use crate::obs::{self, ArmCycleSpan};

/// Coarse state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    NoEditionSelected,
    /// Armed: the next decoded code will be submitted.
    AwaitingFrame,
    /// Disarmed with this cycle's request in flight.
    Submitting,
    /// Disarmed; waiting for the user to re-arm.
    Scanned,
}

/// Why a decoded code was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredDecode {
    NoEdition,
    /// Already captured a code this cycle.
    Disarmed,
    /// A request is outstanding.
    InFlight,
    EmptyCode,
    /// Symbology outside the barcode filter.
    Filtered,
    /// Camera is not supplying frames (unfocused, no permission, disarmed).
    CameraInactive,
    /// Session not resolved to present.
    Unauthenticated,
}

impl IgnoredDecode {
    pub fn as_str(self) -> &'static str {
        match self {
            IgnoredDecode::NoEdition => "no_edition",
            IgnoredDecode::Disarmed => "disarmed",
            IgnoredDecode::InFlight => "in_flight",
            IgnoredDecode::EmptyCode => "empty_code",
            IgnoredDecode::Filtered => "filtered",
            IgnoredDecode::CameraInactive => "camera_inactive",
            IgnoredDecode::Unauthenticated => "unauthenticated",
        }
    }
}

/// Result of feeding one decoded code to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The controller disarmed; the caller must submit this exactly once.
    Submit(PendingCheckIn),
    Ignored(IgnoredDecode),
}

/// Result of applying a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Success; navigate to the result screen.
    Handoff(ResultHandoff),
    /// Failure; the message is now in `ScanState::error`.
    Failed { message: String },
    /// Belongs to an older arm cycle or edition; discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ScanController {
    edition: Option<Edition>,
    state: ScanState,
    cycle: ArmCycle,
    in_flight: Option<ArmCycle>,
    cycle_span: ArmCycleSpan,
}

impl ScanController {
    /// Enter the scanner with the edition from navigation, if any.
    pub fn new(edition: Option<Edition>) -> Self {
        let slug = edition.as_ref().map(|e| e.slug.as_str());
        let cycle_span = ArmCycleSpan::open(ArmCycle(0), slug);
        Self {
            edition,
            state: ScanState::armed(),
            cycle: ArmCycle(0),
            in_flight: None,
            cycle_span,
        }
    }

    pub fn edition(&self) -> Option<&Edition> {
        self.edition.as_ref()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn cycle(&self) -> ArmCycle {
        self.cycle
    }

    pub fn cycle_span(&self) -> &ArmCycleSpan {
        &self.cycle_span
    }

    fn reopen_span(&mut self) {
        self.cycle_span = ArmCycleSpan::open(
            self.cycle,
            self.edition.as_ref().map(|e| e.slug.as_str()),
        );
    }

    pub fn is_armed(&self) -> bool {
        self.edition.is_some() && self.state.armed
    }

    /// Whether any request (current or stale) is outstanding.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> ScanPhase {
        if self.edition.is_none() {
            ScanPhase::NoEditionSelected
        } else if self.state.armed {
            ScanPhase::AwaitingFrame
        } else if self.in_flight == Some(self.cycle) {
            ScanPhase::Submitting
        } else {
            ScanPhase::Scanned
        }
    }

    /// `NoEditionSelected → AwaitingFrame`.
    pub fn select_edition(&mut self, edition: Edition) -> ScanResult<()> {
        if let Some(current) = &self.edition {
            return Err(ScanError::EditionAlreadySelected(current.slug.clone()));
        }
        self.edition = Some(edition);
        self.state = ScanState::armed();
        self.reopen_span();
        let _entered = self.cycle_span.enter();
        debug!(cycle = %self.cycle, "Edition selected");
        Ok(())
    }

    /// Handle one decoded code.
    pub fn on_decode(&mut self, code: &str) -> DecodeOutcome {
        let span = self.cycle_span.clone();
        let _entered = span.enter();
        let reason = match &self.edition {
            None => Some(IgnoredDecode::NoEdition),
            Some(_) if !self.state.armed => Some(if self.in_flight.is_some() {
                IgnoredDecode::InFlight
            } else {
                IgnoredDecode::Disarmed
            }),
            Some(_) if self.in_flight.is_some() => Some(IgnoredDecode::InFlight),
            Some(_) if code.trim().is_empty() => Some(IgnoredDecode::EmptyCode),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            obs::emit_decode_ignored(self.cycle, reason.as_str());
            return DecodeOutcome::Ignored(reason);
        }

        let Some(edition) = &self.edition else {
            return DecodeOutcome::Ignored(IgnoredDecode::NoEdition);
        };
        let code = code.trim().to_string();

        // Latch before anything else can observe the controller.
        self.state.armed = false;
        self.state.last_code = Some(code.clone());
        self.state.error = None;
        self.in_flight = Some(self.cycle);

        let request = CheckInRequest {
            participant_id: code,
            edition_slug: edition.slug.clone(),
        };
        let pending = PendingCheckIn::new(request, self.cycle);
        obs::emit_decode_accepted(&pending);
        DecodeOutcome::Submit(pending)
    }

    /// Apply the result of a submission produced by [`Self::on_decode`].
    pub fn on_submission(
        &mut self,
        pending: &PendingCheckIn,
        result: CheckInResult,
    ) -> SubmissionOutcome {
        let span = self.cycle_span.clone();
        let _entered = span.enter();
        if self.in_flight == Some(pending.cycle) {
            self.in_flight = None;
        }

        let current = match &self.edition {
            Some(edition)
                if pending.cycle == self.cycle && edition.slug == pending.edition_slug() =>
            {
                edition.clone()
            }
            _ => {
                obs::emit_stale_result(pending, self.cycle);
                return SubmissionOutcome::Stale;
            }
        };

        match result {
            CheckInResult::Failure { error } => {
                obs::emit_check_in_failed(pending, &error);
                self.state.armed = false;
                self.state.error = Some(error.clone());
                SubmissionOutcome::Failed { message: error }
            }
            success @ CheckInResult::Success(_) => {
                obs::emit_check_in_succeeded(pending);
                // Stay disarmed so navigating back does not silently re-arm.
                self.state.armed = false;
                self.state.error = None;
                SubmissionOutcome::Handoff(ResultHandoff::new(Some(success), current))
            }
        }
    }

    /// `Scanned → AwaitingFrame`: clear `error` and `last_code`, start a new cycle.
    pub fn scan_another(&mut self) -> ScanResult<()> {
        match self.phase() {
            ScanPhase::Submitting => Err(ScanError::SubmissionInFlight),
            ScanPhase::NoEditionSelected | ScanPhase::AwaitingFrame => Err(ScanError::NotScanned),
            ScanPhase::Scanned => {
                self.cycle = self.cycle.next();
                self.state = ScanState::armed();
                self.reopen_span();
                let _entered = self.cycle_span.enter();
                debug!(cycle = %self.cycle, "Re-armed");
                Ok(())
            }
        }
    }

    /// Full reset to `NoEditionSelected`, from any state.
    ///
    /// Does not cancel an outstanding request; its result will be stale.
    pub fn switch_edition(&mut self) -> Route {
        self.edition = None;
        self.state = ScanState::armed();
        self.cycle = self.cycle.next();
        self.reopen_span();
        debug!(cycle = %self.cycle, in_flight = self.in_flight.is_some(), "Edition cleared");
        Route::EditionSelect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CheckInRecord;

    fn edition() -> Edition {
        Edition::new("iw3-2025", "IW3 2025")
    }

    fn record(id: &str) -> CheckInRecord {
        CheckInRecord {
            id: id.into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: None,
            ticket: "Pass 2 jours".into(),
            edition: "iw3-2025".into(),
            created_at: None,
            checked_at: "2025-05-01T10:00:00Z".into(),
            is_checked_in: true,
        }
    }

    fn submit(controller: &mut ScanController, code: &str) -> PendingCheckIn {
        match controller.on_decode(code) {
            DecodeOutcome::Submit(pending) => pending,
            other => panic!("expected submission, got {other:?}"),
        }
    }

    #[test]
    fn test_without_edition_every_decode_is_ignored() {
        let mut controller = ScanController::new(None);
        assert_eq!(controller.phase(), ScanPhase::NoEditionSelected);
        assert_eq!(
            controller.on_decode("PART-123"),
            DecodeOutcome::Ignored(IgnoredDecode::NoEdition)
        );
        assert!(!controller.has_in_flight());
    }

    #[test]
    fn test_decode_disarms_synchronously() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, "PART-123");

        assert_eq!(pending.request.participant_id, "PART-123");
        assert_eq!(pending.request.edition_slug, "iw3-2025");
        assert!(!controller.state().armed);
        assert_eq!(controller.state().last_code.as_deref(), Some("PART-123"));
        assert_eq!(controller.phase(), ScanPhase::Submitting);
    }

    #[test]
    fn test_repeated_decodes_while_submitting_are_dropped() {
        let mut controller = ScanController::new(Some(edition()));
        submit(&mut controller, "PART-123");
        for _ in 0..10 {
            assert_eq!(
                controller.on_decode("PART-123"),
                DecodeOutcome::Ignored(IgnoredDecode::InFlight)
            );
        }
    }

    #[test]
    fn test_empty_code_keeps_controller_armed() {
        let mut controller = ScanController::new(Some(edition()));
        assert_eq!(
            controller.on_decode("  \n"),
            DecodeOutcome::Ignored(IgnoredDecode::EmptyCode)
        );
        assert!(controller.is_armed());
    }

    #[test]
    fn test_decoded_code_is_trimmed() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, " PART-123\n");
        assert_eq!(pending.request.participant_id, "PART-123");
    }

    #[test]
    fn test_success_hands_off_and_stays_disarmed() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, "PART-123");

        let outcome = controller.on_submission(&pending, CheckInResult::Success(record("PART-123")));
        let SubmissionOutcome::Handoff(handoff) = outcome else {
            panic!("expected handoff");
        };
        assert_eq!(handoff.edition, edition());
        assert_eq!(controller.phase(), ScanPhase::Scanned);
        assert!(!controller.state().armed);
        assert!(!controller.has_in_flight());
        assert_eq!(
            controller.on_decode("PART-456"),
            DecodeOutcome::Ignored(IgnoredDecode::Disarmed)
        );
    }

    #[test]
    fn test_failure_sets_error_until_rearmed() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, "PART-123");

        let outcome =
            controller.on_submission(&pending, CheckInResult::failure("already checked in"));
        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                message: "already checked in".into()
            }
        );
        assert_eq!(controller.state().error.as_deref(), Some("already checked in"));
        assert_eq!(controller.phase(), ScanPhase::Scanned);

        controller.scan_another().unwrap();
        assert_eq!(controller.state(), &ScanState::armed());
        assert_eq!(controller.phase(), ScanPhase::AwaitingFrame);
    }

    #[test]
    fn test_scan_another_refused_while_submitting() {
        let mut controller = ScanController::new(Some(edition()));
        submit(&mut controller, "PART-123");
        assert_eq!(controller.scan_another(), Err(ScanError::SubmissionInFlight));
    }

    #[test]
    fn test_scan_another_when_armed_is_not_scanned() {
        let mut controller = ScanController::new(Some(edition()));
        assert_eq!(controller.scan_another(), Err(ScanError::NotScanned));
    }

    #[test]
    fn test_select_edition_only_from_no_edition() {
        let mut controller = ScanController::new(None);
        controller.select_edition(edition()).unwrap();
        assert_eq!(controller.phase(), ScanPhase::AwaitingFrame);
        assert_eq!(
            controller.select_edition(Edition::new("iw3-2026", "IW3 2026")),
            Err(ScanError::EditionAlreadySelected("iw3-2025".into()))
        );
    }

    #[test]
    fn test_switch_edition_resets_from_any_state() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, "PART-123");
        controller.on_submission(&pending, CheckInResult::failure("nope"));

        assert_eq!(controller.switch_edition(), Route::EditionSelect);
        assert_eq!(controller.phase(), ScanPhase::NoEditionSelected);
        assert_eq!(controller.state(), &ScanState::armed());
    }

    #[test]
    fn test_result_after_switch_is_stale_and_releases_latch() {
        let mut controller = ScanController::new(Some(edition()));
        let pending = submit(&mut controller, "PART-123");

        controller.switch_edition();
        controller
            .select_edition(Edition::new("iw3-2026", "IW3 2026"))
            .unwrap();
        // Old request still outstanding: no second submission may start.
        assert_eq!(
            controller.on_decode("PART-999"),
            DecodeOutcome::Ignored(IgnoredDecode::InFlight)
        );

        let outcome = controller.on_submission(&pending, CheckInResult::Success(record("PART-123")));
        assert_eq!(outcome, SubmissionOutcome::Stale);
        assert!(controller.state().error.is_none());
        assert!(controller.is_armed());

        let next = submit(&mut controller, "PART-999");
        assert_eq!(next.request.edition_slug, "iw3-2026");
    }

    #[test]
    fn test_cycle_span_follows_every_new_cycle() {
        let mut controller = ScanController::new(Some(edition()));
        assert_eq!(controller.cycle_span().cycle(), ArmCycle(0));

        let pending = submit(&mut controller, "PART-1");
        controller.on_submission(&pending, CheckInResult::failure("boom"));
        controller.scan_another().unwrap();
        assert_eq!(controller.cycle(), ArmCycle(1));
        assert_eq!(controller.cycle_span().cycle(), controller.cycle());

        controller.switch_edition();
        assert_eq!(controller.cycle_span().cycle(), controller.cycle());
        controller
            .select_edition(Edition::new("iw3-2026", "IW3 2026"))
            .unwrap();
        assert_eq!(controller.cycle_span().cycle(), ArmCycle(2));
    }

    #[test]
    fn test_result_for_older_cycle_is_stale() {
        let mut controller = ScanController::new(Some(edition()));
        let first = submit(&mut controller, "PART-1");
        controller.on_submission(&first, CheckInResult::failure("boom"));
        controller.scan_another().unwrap();

        // A duplicate delivery of the first result must not touch the new cycle.
        assert_eq!(
            controller.on_submission(&first, CheckInResult::failure("boom")),
            SubmissionOutcome::Stale
        );
        assert!(controller.state().error.is_none());
        assert!(controller.is_armed());
    }
}
