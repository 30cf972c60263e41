//! Structured observability hooks for the scan lifecycle.
//!
//! This module provides:
//! - Arm-cycle spans via [`ArmCycleSpan`], reopened on every re-arm
//! - A submission-scoped tracing span via [`check_in_span`]
//! - Emission functions for decode, submission and gate events
//!
//! Participant codes are never logged verbatim; events carry a short
//! SHA-256 digest instead ([`code_digest`]).

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::domain::{ArmCycle, PendingCheckIn};

/// First 12 hex chars of the SHA-256 of a participant code.
pub fn code_digest(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// Span scoped to one arm cycle of the scan controller.
///
/// The controller opens a fresh one whenever the cycle advances or an
/// edition is selected, and enters it around each transition so decode and
/// submission events carry the cycle they belong to.
///
/// # Example
///
/// ```ignore
/// let span = ArmCycleSpan::open(ArmCycle(2), Some("iw3-2025"));
/// let _entered = span.enter();
/// // events here carry cycle = 2, edition = "iw3-2025"
/// ```
#[derive(Debug, Clone)]
pub struct ArmCycleSpan {
    cycle: ArmCycle,
    span: tracing::Span,
}

impl ArmCycleSpan {
    pub fn open(cycle: ArmCycle, edition: Option<&str>) -> Self {
        let span = tracing::info_span!(
            "ticketcheck.arm_cycle",
            cycle = cycle.0,
            edition = edition.unwrap_or(""),
        );
        Self { cycle, span }
    }

    /// Enter the span until the guard drops.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn cycle(&self) -> ArmCycle {
        self.cycle
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

/// Span covering one submission round trip.
///
/// # Example
///
/// ```ignore
/// submitter.submit(&pending.request).instrument(check_in_span(&pending)).await;
/// ```
pub fn check_in_span(pending: &PendingCheckIn) -> tracing::Span {
    tracing::info_span!(
        "ticketcheck.check_in",
        request_id = %pending.request_id,
        cycle = pending.cycle.0,
        edition = %pending.edition_slug(),
    )
}

/// Emit event: a decoded code was dropped without a request.
pub fn emit_decode_ignored(cycle: ArmCycle, reason: &str) {
    debug!(event = "scan.ignored", cycle = cycle.0, reason = %reason);
}

/// Emit event: a decoded code disarmed the controller.
pub fn emit_decode_accepted(pending: &PendingCheckIn) {
    info!(
        event = "scan.decoded",
        request_id = %pending.request_id,
        cycle = pending.cycle.0,
        edition = %pending.edition_slug(),
        code_digest = %code_digest(&pending.request.participant_id),
    );
}

/// Emit event: the check-in request is leaving.
pub fn emit_check_in_submitted(pending: &PendingCheckIn) {
    info!(
        event = "checkin.submitted",
        request_id = %pending.request_id,
        edition = %pending.edition_slug(),
    );
}

pub fn emit_check_in_succeeded(pending: &PendingCheckIn) {
    info!(
        event = "checkin.succeeded",
        request_id = %pending.request_id,
        edition = %pending.edition_slug(),
    );
}

/// Emit event: server or transport failure (warning level).
pub fn emit_check_in_failed(pending: &PendingCheckIn, error: &str) {
    warn!(
        event = "checkin.failed",
        request_id = %pending.request_id,
        edition = %pending.edition_slug(),
        error = %error,
    );
}

/// Emit event: a result arrived for an older cycle or edition.
pub fn emit_stale_result(pending: &PendingCheckIn, current: ArmCycle) {
    info!(
        event = "checkin.stale",
        request_id = %pending.request_id,
        cycle = pending.cycle.0,
        current_cycle = current.0,
    );
}

pub fn emit_session_redirect(to: &str) {
    info!(event = "session.redirect", to = %to);
}

pub fn emit_permission_requested() {
    info!(event = "permission.requested");
}
