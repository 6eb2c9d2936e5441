//! Infrastructure layer: HTTP access, HTML parsing, configuration and logging

pub mod config;
pub mod logging;
pub mod output_file;
pub mod parsing;
pub mod simple_http_client;

pub use config::{AppConfig, ConfigError, ConfigManager, exodus};
pub use logging::init_logging;
pub use output_file::write_atomically;
pub use parsing::{ParsingError, ParsingResult, TrackerDetailParser, TrackerListParser};
pub use simple_http_client::{HttpClient, HttpError, TrackerSource};
