//! Tracker records collected from the Exodus catalog

use serde::{Deserialize, Serialize};

/// One tracker with the hostnames it talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Display name as listed on the index page
    pub name: String,
    /// Validated hostnames, in page order, duplicates kept
    pub urls: Vec<String>,
    /// Absolute link to the tracker's report page
    pub exodus_link: String,
}

impl Tracker {
    #[must_use]
    pub const fn new(name: String, urls: Vec<String>, exodus_link: String) -> Self {
        Self {
            name,
            urls,
            exodus_link,
        }
    }

    #[must_use]
    pub fn has_urls(&self) -> bool {
        !self.urls.is_empty()
    }
}

/// A `(link, name)` pair scraped from the tracker index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIndexEntry {
    /// Link relative to the reports site, e.g. `/en/trackers/70/`
    pub relative_link: String,
    pub display_name: String,
}

impl TrackerIndexEntry {
    pub fn new(relative_link: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            relative_link: relative_link.into(),
            display_name: display_name.into(),
        }
    }
}

/// Stable, case-sensitive ordering by tracker name.
pub fn sort_by_name(trackers: &mut [Tracker]) {
    trackers.sort_by(|a, b| a.name.cmp(&b.name));
}
