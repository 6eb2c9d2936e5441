//! CSS selectors for Exodus report pages

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub tracker_list_selectors: TrackerListSelectors,
    pub tracker_detail_selectors: TrackerDetailSelectors,
}

/// Selectors for the tracker index page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerListSelectors {
    /// One element per tracker; its first `<p>` holds the link
    pub tracker_block: String,
}

impl Default for TrackerListSelectors {
    fn default() -> Self {
        Self {
            // exact class match, `<div class="trackers">`
            tracker_block: r#"div[class="trackers"]"#.to_string(),
        }
    }
}

/// Selectors for a tracker detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDetailSelectors {
    /// Candidate `<code>` elements in the main content column
    pub code_block: String,

    /// Zero-based position of the hostname list among `code_block` matches.
    /// The first one holds the code signature, the second the network
    /// detection rule.
    pub hostnames_position: usize,
}

impl Default for TrackerDetailSelectors {
    fn default() -> Self {
        Self {
            code_block: r#"div[class*="col-md-8"] code"#.to_string(),
            hostnames_position: 1,
        }
    }
}
