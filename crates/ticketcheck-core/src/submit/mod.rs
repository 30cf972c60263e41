//! Check-in submission.
//!
//! A [`CheckInSubmitter`] turns one request into exactly one
//! [`CheckInResult`]. It never retries and never fails out-of-band:
//! every transport or server problem is folded into a failure record
//! carrying the message the user should see.

pub mod http;

use async_trait::async_trait;

use crate::domain::{CheckInRequest, CheckInResult};

pub use http::HttpCheckInSubmitter;

/// Sends a check-in to the remote service.
#[async_trait]
pub trait CheckInSubmitter: Send + Sync {
    /// Exactly one network call. Input is assumed non-empty.
    async fn submit(&self, request: &CheckInRequest) -> CheckInResult;
}

#[async_trait]
impl<S: CheckInSubmitter + ?Sized> CheckInSubmitter for std::sync::Arc<S> {
    async fn submit(&self, request: &CheckInRequest) -> CheckInResult {
        (**self).submit(request).await
    }
}
