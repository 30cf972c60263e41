//! In-memory fakes for collaborator traits (testing only)
//!
//! Provides `ScriptedCamera`, `RecordingSubmitter` and `FixedSession`
//! that satisfy the collaborator contracts without a device or a network,
//! plus [`staff_session`] for a signed-in status.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ticketcheck_auth::{Session, SessionInfo, SessionSource, SessionStatus, User};

use crate::camera::{CameraPermissions, PermissionApiError, PermissionState};
use crate::domain::{CheckInRequest, CheckInResult};
use crate::submit::CheckInSubmitter;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// ScriptedCamera
// ---------------------------------------------------------------------------

/// Camera permission API with a fixed initial status and scripted answers.
#[derive(Debug)]
pub struct ScriptedCamera {
    status: Mutex<PermissionState>,
    answers: Mutex<VecDeque<PermissionState>>,
    requests: Mutex<usize>,
    fail_requests: bool,
}

impl ScriptedCamera {
    pub fn new(initial: PermissionState) -> Self {
        Self {
            status: Mutex::new(initial),
            answers: Mutex::new(VecDeque::new()),
            requests: Mutex::new(0),
            fail_requests: false,
        }
    }

    /// Answers returned by successive `request()` calls. Once exhausted,
    /// requests return the current status unchanged.
    pub fn answering(self, answers: impl IntoIterator<Item = PermissionState>) -> Self {
        *lock(&self.answers) = answers.into_iter().collect();
        self
    }

    /// Every `request()` fails with a platform error.
    pub fn failing_requests(mut self) -> Self {
        self.fail_requests = true;
        self
    }

    pub fn request_count(&self) -> usize {
        *lock(&self.requests)
    }
}

#[async_trait]
impl CameraPermissions for ScriptedCamera {
    async fn status(&self) -> Result<PermissionState, PermissionApiError> {
        Ok(*lock(&self.status))
    }

    async fn request(&self) -> Result<PermissionState, PermissionApiError> {
        *lock(&self.requests) += 1;
        if self.fail_requests {
            return Err(PermissionApiError("prompt dismissed by system".into()));
        }
        let mut status = lock(&self.status);
        if let Some(next) = lock(&self.answers).pop_front() {
            *status = next;
        }
        Ok(*status)
    }
}

// ---------------------------------------------------------------------------
// RecordingSubmitter
// ---------------------------------------------------------------------------

/// Submitter that records every request and replays scripted results.
///
/// When the script runs out it answers with the generic failure.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    requests: Mutex<Vec<CheckInRequest>>,
    results: Mutex<VecDeque<CheckInResult>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: impl IntoIterator<Item = CheckInResult>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            results: Mutex::new(results.into_iter().collect()),
        }
    }

    pub fn push_result(&self, result: CheckInResult) {
        lock(&self.results).push_back(result);
    }

    pub fn requests(&self) -> Vec<CheckInRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl CheckInSubmitter for RecordingSubmitter {
    async fn submit(&self, request: &CheckInRequest) -> CheckInResult {
        lock(&self.requests).push(request.clone());
        lock(&self.results)
            .pop_front()
            .unwrap_or_else(CheckInResult::generic_failure)
    }
}

// ---------------------------------------------------------------------------
// FixedSession
// ---------------------------------------------------------------------------

/// Session source returning whatever status it was last given.
#[derive(Debug)]
pub struct FixedSession {
    status: Mutex<SessionStatus>,
}

impl FixedSession {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status: Mutex::new(status),
        }
    }

    pub fn set(&self, status: SessionStatus) {
        *lock(&self.status) = status;
    }
}

#[async_trait]
impl SessionSource for FixedSession {
    async fn session_status(&self) -> SessionStatus {
        lock(&self.status).clone()
    }
}

/// A present session for a staff member, valid until 2030.
pub fn staff_session() -> SessionStatus {
    let created: DateTime<Utc> = DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default();
    let expires = DateTime::from_timestamp(1_893_456_000, 0).unwrap_or_default();
    SessionStatus::Present(Box::new(Session {
        session: SessionInfo {
            id: "sess_staff".into(),
            user_id: "usr_staff".into(),
            expires_at: expires,
            token: None,
        },
        user: User {
            id: "usr_staff".into(),
            email: "staff@iw3.fr".into(),
            email_verified: true,
            name: "Camille Staff".into(),
            first_name: None,
            last_name: None,
            role: Some("staff".into()),
            description: None,
            image: None,
            created_at: created,
            updated_at: created,
            socials: None,
        },
    }))
}
