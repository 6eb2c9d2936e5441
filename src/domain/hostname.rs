//! DNS hostname validation
//!
//! Hostnames scraped from report pages are free text; only strings that look
//! like real, fully qualified hostnames are allowed into a [`Tracker`].
//!
//! [`Tracker`]: super::Tracker

use once_cell::sync::Lazy;
use regex::Regex;

/// 1-63 letters, digits or hyphens, not starting or ending with a hyphen.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("label pattern compiles")
});

/// Top level domain: two or more letters.
static TLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,}$").expect("tld pattern compiles"));

/// Returns `true` if `candidate` is a syntactically valid DNS hostname.
///
/// At least one label must precede the TLD, so bare names such as
/// `localhost` are rejected. Consecutive hyphens are rejected anywhere.
#[must_use]
pub fn is_valid_hostname(candidate: &str) -> bool {
    if candidate.contains("--") {
        return false;
    }

    let Some((labels, tld)) = candidate.rsplit_once('.') else {
        return false;
    };

    TLD_RE.is_match(tld) && labels.split('.').all(|label| LABEL_RE.is_match(label))
}
