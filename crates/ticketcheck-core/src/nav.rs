//! Navigation routes and their string parameters.
//!
//! Screens hand values to each other only through opaque string
//! parameters: the edition as `slug` + `title`, the check-in result as a
//! JSON string under `result`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ticketcheck_auth::SessionPhase;

/// Opaque string parameters carried by a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavParams(BTreeMap<String, String>);

impl NavParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NavParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        NavParams(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Screens of the check-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    /// Unauthenticated entry point.
    SignIn,
    EditionSelect,
    Scanner {
        slug: String,
        title: String,
    },
    Result {
        /// Serialized `CheckInResult`.
        result: String,
        slug: String,
        title: String,
    },
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/sign-in",
            Route::EditionSelect => "/edition-select",
            Route::Scanner { .. } => "/qr-scanner",
            Route::Result { .. } => "/result",
        }
    }

    pub fn params(&self) -> NavParams {
        match self {
            Route::SignIn | Route::EditionSelect => NavParams::new(),
            Route::Scanner { slug, title } => NavParams::new()
                .with("slug", slug.as_str())
                .with("title", title.as_str()),
            Route::Result {
                result,
                slug,
                title,
            } => NavParams::new()
                .with("result", result.as_str())
                .with("slug", slug.as_str())
                .with("title", title.as_str()),
        }
    }
}

/// Sign-in entry: forwards to edition selection once a session exists.
#[derive(Debug, Default)]
pub struct SignInScreen {
    forwarded: bool,
}

impl SignInScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the forward route the first time the session is present.
    pub fn observe(&mut self, phase: SessionPhase) -> Option<Route> {
        match phase {
            SessionPhase::Present if !self.forwarded => {
                self.forwarded = true;
                Some(Route::EditionSelect)
            }
            SessionPhase::Present => None,
            SessionPhase::Pending | SessionPhase::Absent => {
                self.forwarded = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_route_params() {
        let route = Route::Scanner {
            slug: "iw3-2025".into(),
            title: "IW3 2025".into(),
        };
        let params = route.params();
        assert_eq!(params.get("slug"), Some("iw3-2025"));
        assert_eq!(params.get("title"), Some("IW3 2025"));
        assert_eq!(route.path(), "/qr-scanner");
    }

    #[test]
    fn test_params_from_iter() {
        let params: NavParams = [("slug", "a"), ("title", "b")].into_iter().collect();
        assert_eq!(params.get("slug"), Some("a"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_sign_in_forwards_once_per_session() {
        let mut screen = SignInScreen::new();
        assert_eq!(screen.observe(SessionPhase::Pending), None);
        assert_eq!(
            screen.observe(SessionPhase::Present),
            Some(Route::EditionSelect)
        );
        assert_eq!(screen.observe(SessionPhase::Present), None);

        screen.observe(SessionPhase::Absent);
        assert_eq!(
            screen.observe(SessionPhase::Present),
            Some(Route::EditionSelect)
        );
    }
}
