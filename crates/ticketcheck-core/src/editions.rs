//! Edition selection: the calendar fetch and the screen that lists it.

use serde::Deserialize;
use tracing::{debug, instrument};

use ticketcheck_auth::SessionPhase;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::domain::EditionListing;
use crate::nav::Route;

/// tRPC procedure listing upcoming editions.
pub const EDITIONS_PATH: &str = "/trpc/editions.calendar";

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<EnvelopeResult>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    json: Option<Vec<EditionListing>>,
}

impl Envelope {
    fn into_listings(self) -> Vec<EditionListing> {
        self.result
            .and_then(|r| r.data)
            .and_then(|d| d.json)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct EditionsClient {
    api: ApiClient,
}

impl EditionsClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    pub fn from_client(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the calendar. A response without the tRPC envelope is an
    /// empty calendar, not an error.
    #[instrument(skip(self))]
    pub async fn calendar(&self) -> Result<Vec<EditionListing>, ApiError> {
        let envelope: Option<Envelope> = self.api.get_json(EDITIONS_PATH).await?;
        let listings = envelope.unwrap_or_default().into_listings();
        debug!(count = listings.len(), "Editions fetched");
        Ok(listings)
    }
}

/// Progress of the calendar fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    InProgress,
    Failed(String),
    Loaded(Vec<EditionListing>),
}

impl From<Result<Vec<EditionListing>, ApiError>> for FetchState {
    fn from(result: Result<Vec<EditionListing>, ApiError>) -> Self {
        match result {
            Ok(listings) => FetchState::Loaded(listings),
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditionSelectView {
    Loading,
    SignInRequired,
    /// Offer a retry.
    LoadFailed { message: String },
    /// Offer a refresh.
    Empty,
    List(Vec<EditionListing>),
}

/// Edition-select screen model.
#[derive(Debug, Clone, Default)]
pub struct EditionSelect;

impl EditionSelect {
    pub fn view(session: SessionPhase, fetch: &FetchState) -> EditionSelectView {
        match (session, fetch) {
            (SessionPhase::Pending, _) | (_, FetchState::InProgress) => EditionSelectView::Loading,
            (SessionPhase::Absent, _) => EditionSelectView::SignInRequired,
            (SessionPhase::Present, FetchState::Failed(message)) => EditionSelectView::LoadFailed {
                message: message.clone(),
            },
            (SessionPhase::Present, FetchState::Loaded(listings)) if listings.is_empty() => {
                EditionSelectView::Empty
            }
            (SessionPhase::Present, FetchState::Loaded(listings)) => {
                EditionSelectView::List(listings.clone())
            }
        }
    }

    pub fn select(listing: &EditionListing) -> Route {
        Route::Scanner {
            slug: listing.slug.clone(),
            title: listing.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> EditionListing {
        EditionListing {
            title: "IW3 2025".into(),
            start_date: "2025-05-01".into(),
            slug: "iw3-2025".into(),
            description: "Salon annuel".into(),
            location: "Paris".into(),
        }
    }

    #[test]
    fn test_envelope_unwraps_listings() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"result":{"data":{"json":[{"title":"IW3 2025","slug":"iw3-2025"}]}}}"#,
        )
        .unwrap();
        let listings = envelope.into_listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].slug, "iw3-2025");
    }

    #[test]
    fn test_missing_envelope_is_empty() {
        let envelope: Envelope = serde_json::from_str(r#"{"result":{}}"#).unwrap();
        assert!(envelope.into_listings().is_empty());
        let envelope: Envelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_listings().is_empty());
    }

    #[test]
    fn test_view_precedence() {
        let loaded = FetchState::Loaded(vec![listing()]);
        assert_eq!(
            EditionSelect::view(SessionPhase::Pending, &loaded),
            EditionSelectView::Loading
        );
        assert_eq!(
            EditionSelect::view(SessionPhase::Present, &FetchState::InProgress),
            EditionSelectView::Loading
        );
        assert_eq!(
            EditionSelect::view(SessionPhase::Absent, &loaded),
            EditionSelectView::SignInRequired
        );
        assert_eq!(
            EditionSelect::view(SessionPhase::Present, &FetchState::Loaded(vec![])),
            EditionSelectView::Empty
        );
        assert_eq!(
            EditionSelect::view(SessionPhase::Present, &FetchState::Failed("offline".into())),
            EditionSelectView::LoadFailed {
                message: "offline".into()
            }
        );
        assert_eq!(
            EditionSelect::view(SessionPhase::Present, &loaded),
            EditionSelectView::List(vec![listing()])
        );
    }

    #[test]
    fn test_select_routes_to_scanner() {
        assert_eq!(
            EditionSelect::select(&listing()),
            Route::Scanner {
                slug: "iw3-2025".into(),
                title: "IW3 2025".into()
            }
        );
    }
}
