//! reqwest-backed check-in submitter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use ticketcheck_auth::CredentialSource;

use super::CheckInSubmitter;
use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::domain::{CheckInRequest, CheckInResult};

/// Route of the check-in endpoint under the API base URL.
pub const CHECK_IN_PATH: &str = "/check-in";

/// Posts check-ins to `{api}/check-in` with the session cookie.
pub struct HttpCheckInSubmitter {
    api: ApiClient,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpCheckInSubmitter {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            api: ApiClient::new(config)?,
            credentials,
        })
    }

    pub fn from_client(api: ApiClient, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl CheckInSubmitter for HttpCheckInSubmitter {
    #[instrument(skip_all, fields(edition = %request.edition_slug))]
    async fn submit(&self, request: &CheckInRequest) -> CheckInResult {
        let cookie = self.credentials.cookie_header();
        if cookie.is_none() {
            warn!("Submitting check-in without a session cookie");
        }

        match self
            .api
            .post_json::<_, CheckInResult>(CHECK_IN_PATH, request, cookie.as_deref())
            .await
        {
            Ok(result) => result,
            Err(err) => failure_from(err),
        }
    }
}

/// Fold an API error into the failure record shown to the user.
fn failure_from(err: ApiError) -> CheckInResult {
    match err.server_message() {
        Some(message) => CheckInResult::failure(message),
        None => {
            warn!(error = %err, "Check-in failed without a server message");
            CheckInResult::generic_failure()
        }
    }
}
