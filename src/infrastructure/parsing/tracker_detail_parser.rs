//! Tracker detail page parser
//!
//! The network detection rule is rendered as a regex alternation such as
//! `app\.adjust\.com|adjust\.io`. Backslashes are dropped and the rule is
//! split on `|`; validation of the resulting tokens is left to the caller.

use scraper::{Html, Selector};
use tracing::debug;

use super::config::TrackerDetailSelectors;
use super::{HtmlParser, ParsingError, ParsingResult, compile_selector};

const FIELD_NAME: &str = "network detection rule";

/// Parser for a single tracker's detail page
#[derive(Debug, Clone)]
pub struct TrackerDetailParser {
    code_block: Selector,
    hostnames_position: usize,
}

impl TrackerDetailParser {
    /// Create a parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&TrackerDetailSelectors::default())
    }

    pub fn with_config(selectors: &TrackerDetailSelectors) -> ParsingResult<Self> {
        Ok(Self {
            code_block: compile_selector(&selectors.code_block)?,
            hostnames_position: selectors.hostnames_position,
        })
    }

    /// Split a detection rule into trimmed candidate hostnames
    #[must_use]
    pub fn split_rule(rule: &str) -> Vec<String> {
        rule.replace('\\', "")
            .split('|')
            .map(|token| token.trim().to_string())
            .collect()
    }
}

impl HtmlParser for TrackerDetailParser {
    type Output = Vec<String>;

    /// Fails with [`ParsingError::RequiredFieldMissing`] when the rule block
    /// or its text is absent, so a markup change cannot pass for a tracker
    /// without hostnames.
    fn parse(&self, html: &str) -> ParsingResult<Self::Output> {
        let document = Html::parse_document(html);

        let code = document
            .select(&self.code_block)
            .nth(self.hostnames_position)
            .ok_or_else(|| ParsingError::required_field_missing(FIELD_NAME, Some("code block not found")))?;

        // first direct text node, nested markup is ignored
        let rule = code
            .children()
            .find_map(|node| node.value().as_text().map(|text| (**text).to_owned()))
            .ok_or_else(|| ParsingError::required_field_missing(FIELD_NAME, Some("code block is empty")))?;

        let candidates = Self::split_rule(&rule);
        debug!("Detection rule yielded {} candidates", candidates.len());
        Ok(candidates)
    }
}
