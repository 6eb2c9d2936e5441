//! HTML parsing for Exodus report pages
//!
//! Two page shapes are understood: the tracker index (one block per tracker)
//! and a tracker's detail page (a pipe separated hostname list inside a
//! `<code>` element).

pub mod config;
pub mod error;
pub mod tracker_detail_parser;
pub mod tracker_list_parser;

pub use config::ParsingConfig;
pub use error::{ParsingError, ParsingResult};
pub use tracker_detail_parser::TrackerDetailParser;
pub use tracker_list_parser::TrackerListParser;

use crate::domain::TrackerIndexEntry;
use scraper::Selector;

/// Parser from a raw HTML document to a typed result
pub trait HtmlParser {
    type Output;

    fn parse(&self, html: &str) -> ParsingResult<Self::Output>;
}

/// `(link, name)` pairs from the tracker index, using default selectors.
pub fn extract_index(html: &str) -> ParsingResult<Vec<TrackerIndexEntry>> {
    TrackerListParser::new()?.parse(html)
}

/// Raw hostname candidates from a tracker detail page, using default selectors.
pub fn extract_detail_urls(html: &str) -> ParsingResult<Vec<String>> {
    TrackerDetailParser::new()?.parse(html)
}

pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
}

/// XPath `normalize-space`: collapse runs of space, tab, CR and LF into a
/// single space and strip them from both ends. Other whitespace, such as
/// U+00A0, is left untouched.
pub(crate) fn normalize_space(text: &str) -> String {
    text.split([' ', '\t', '\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
