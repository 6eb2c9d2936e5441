//! Rendering collected trackers into output formats

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::domain::Tracker;
use crate::infrastructure::config::exodus::DNSMASQ_ATTRIBUTION;

const CSV_HEADER: [&str; 3] = ["name", "urls", "exodus_link"];
const URL_SEPARATOR: &str = ", ";
const SINKHOLE_ADDRESS: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    CsvFlush(String),

    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty printed JSON array
    Json,
    /// CSV with a `name,urls,exodus_link` header
    Csv,
    /// dnsmasq `address=` sinkhole directives
    Dnsmasq,
}

impl OutputFormat {
    pub fn render(self, trackers: &[Tracker]) -> Result<String, ExportError> {
        match self {
            Self::Json => to_json(trackers),
            Self::Csv => to_csv(trackers),
            Self::Dnsmasq => Ok(to_dnsmasq(trackers)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Dnsmasq => "dnsmasq",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON array with 4-space indentation
pub fn to_json(trackers: &[Tracker]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    trackers.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

/// CSV with minimal quoting and CRLF line endings; hostnames are joined
/// into one field.
pub fn to_csv(trackers: &[Tracker]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for tracker in trackers {
        let urls = tracker.urls.join(URL_SEPARATOR);
        writer.write_record([tracker.name.as_str(), urls.as_str(), tracker.exodus_link.as_str()])?;
    }

    let buffer = writer.into_inner().map_err(|e| ExportError::CsvFlush(e.error().to_string()))?;
    Ok(String::from_utf8(buffer)?)
}

/// dnsmasq configuration sinking every hostname to `0.0.0.0`
#[must_use]
pub fn to_dnsmasq(trackers: &[Tracker]) -> String {
    let mut output = format!("{DNSMASQ_ATTRIBUTION}\n\n");

    for tracker in trackers {
        output.push_str(&format!("# {} {}\n", tracker.name, tracker.exodus_link));
        let directives: Vec<String> = tracker
            .urls
            .iter()
            .map(|url| format!("address=/{url}/{SINKHOLE_ADDRESS}"))
            .collect();
        output.push_str(&directives.join("\n"));
        output.push_str("\n\n");
    }

    output
}
