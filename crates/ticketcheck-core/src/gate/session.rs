//! Session gate.

use ticketcheck_auth::SessionPhase;

use crate::nav::Route;
use crate::obs;

/// What the session gate lets the screen do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// Resolution pending; block every core action.
    Wait,
    /// Session just became absent; navigate to the returned route.
    Redirect(Route),
    /// Session still absent after the redirect was issued.
    Blocked,
    /// Session present.
    Proceed,
}

impl SessionDecision {
    pub fn allows_proceed(&self) -> bool {
        matches!(self, SessionDecision::Proceed)
    }
}

/// Reacts to the externally supplied session phase.
///
/// The only thing remembered is the previously observed phase, so that
/// repeated observations of `Absent` (re-renders) do not issue repeated
/// redirects.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    last: Option<SessionPhase>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, phase: SessionPhase) -> SessionDecision {
        let previous = self.last.replace(phase);
        match phase {
            SessionPhase::Pending => SessionDecision::Wait,
            SessionPhase::Present => SessionDecision::Proceed,
            SessionPhase::Absent if previous == Some(SessionPhase::Absent) => {
                SessionDecision::Blocked
            }
            SessionPhase::Absent => {
                obs::emit_session_redirect(Route::SignIn.path());
                SessionDecision::Redirect(Route::SignIn)
            }
        }
    }

    /// Last phase observed, if any.
    pub fn phase(&self) -> Option<SessionPhase> {
        self.last
    }

    pub fn is_present(&self) -> bool {
        self.last == Some(SessionPhase::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_waits() {
        let mut gate = SessionGate::new();
        assert_eq!(gate.observe(SessionPhase::Pending), SessionDecision::Wait);
        assert!(!gate.is_present());
    }

    #[test]
    fn test_absent_redirects_exactly_once() {
        let mut gate = SessionGate::new();
        assert_eq!(
            gate.observe(SessionPhase::Absent),
            SessionDecision::Redirect(Route::SignIn)
        );
        for _ in 0..5 {
            assert_eq!(gate.observe(SessionPhase::Absent), SessionDecision::Blocked);
        }
    }

    #[test]
    fn test_new_transition_into_absent_redirects_again() {
        let mut gate = SessionGate::new();
        gate.observe(SessionPhase::Absent);
        assert_eq!(gate.observe(SessionPhase::Present), SessionDecision::Proceed);
        assert_eq!(
            gate.observe(SessionPhase::Absent),
            SessionDecision::Redirect(Route::SignIn)
        );
    }

    #[test]
    fn test_pending_between_absents_counts_as_transition() {
        let mut gate = SessionGate::new();
        gate.observe(SessionPhase::Absent);
        gate.observe(SessionPhase::Pending);
        assert!(matches!(
            gate.observe(SessionPhase::Absent),
            SessionDecision::Redirect(_)
        ));
    }
}
