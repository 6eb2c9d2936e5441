//! Tracker index parser
//!
//! Each `<div class="trackers">` block looks like
//! `<p><a href="/en/trackers/70/">Google Firebase Analytics&nbsp;<span>…</span></a></p>`.
//! Blocks that do not match are skipped; the index is scraped best-effort.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::config::TrackerListSelectors;
use super::{HtmlParser, ParsingResult, compile_selector, normalize_space};
use crate::domain::TrackerIndexEntry;

const NBSP: char = '\u{a0}';

/// Parser for the tracker index page
#[derive(Debug, Clone)]
pub struct TrackerListParser {
    tracker_block: Selector,
}

impl TrackerListParser {
    /// Create a parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&TrackerListSelectors::default())
    }

    pub fn with_config(selectors: &TrackerListSelectors) -> ParsingResult<Self> {
        Ok(Self {
            tracker_block: compile_selector(&selectors.tracker_block)?,
        })
    }

    fn first_child_named<'a>(element: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
        element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == name)
    }

    fn extract_entry(block: &ElementRef<'_>) -> Option<TrackerIndexEntry> {
        let paragraph = Self::first_child_named(block, "p")?;
        let anchor = Self::first_child_named(&paragraph, "a")?;
        let href = anchor.value().attr("href")?;

        let text = normalize_space(&anchor.text().collect::<String>());
        // drop the "&nbsp;<count>" annotation after the name
        let name = text.split(NBSP).next().unwrap_or_default().trim();

        Some(TrackerIndexEntry::new(href, name))
    }
}

impl HtmlParser for TrackerListParser {
    type Output = Vec<TrackerIndexEntry>;

    fn parse(&self, html: &str) -> ParsingResult<Self::Output> {
        let document = Html::parse_document(html);
        let mut entries = Vec::new();

        for (index, block) in document.select(&self.tracker_block).enumerate() {
            match Self::extract_entry(&block) {
                Some(entry) => entries.push(entry),
                None => debug!("Skipping tracker block {} without a link", index),
            }
        }

        info!("Found {} trackers", entries.len());
        Ok(entries)
    }
}
