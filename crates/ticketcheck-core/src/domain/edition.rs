//! Event editions.

use serde::{Deserialize, Serialize};

use crate::nav::NavParams;

/// The edition staff are checking attendees into.
///
/// Chosen once on the edition-select screen and threaded through the
/// scanner and result screens. Never edited in place; switching editions
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edition {
    pub slug: String,
    pub title: String,
}

impl Edition {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
        }
    }

    /// Read the edition from navigation parameters.
    ///
    /// Requires a non-empty `slug`. A missing `title` falls back to the slug.
    pub fn from_params(params: &NavParams) -> Option<Self> {
        let slug = params.get("slug").map(str::trim).filter(|s| !s.is_empty())?;
        let title = params
            .get("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(slug);
        Some(Self::new(slug, title))
    }
}

/// One row of the editions calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionListing {
    pub title: String,
    #[serde(default)]
    pub start_date: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl EditionListing {
    pub fn to_edition(&self) -> Edition {
        Edition::new(self.slug.clone(), self.title.clone())
    }
}
