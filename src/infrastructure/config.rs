//! Configuration infrastructure
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional TOML/JSON/YAML file (explicit path, or the per-user config dir)
//! 3. `TRACKERS_BLOCK__*` environment variables
//! 4. Command line flags, applied by the caller

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Exodus Privacy reports website
pub mod exodus {
    /// Base URL of the reports site; relative tracker links are appended to it
    pub const BASE_URL: &str = "https://reports.exodus-privacy.eu.org";

    /// Tracker index listing every tracker found in apps
    pub const TRACKERS_INDEX_PATH: &str = "/en/trackers/?filter=apps";

    /// First line of every generated dnsmasq file
    pub const DNSMASQ_ATTRIBUTION: &str = "# https://github.com/Vlad2030/trackers-block/";
}

/// Default values for configuration
pub mod defaults {
    pub const MAX_CONCURRENT_WORKERS: usize = 16;
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    pub const USER_AGENT: &str = concat!("trackers-block/", env!("CARGO_PKG_VERSION"));
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;

    /// Environment variable prefix for overrides
    pub const ENV_PREFIX: &str = "TRACKERS_BLOCK";
    pub const CONFIG_DIR_NAME: &str = "trackers-block";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub workers: WorkerConfig,
    pub logging: LoggingConfig,
}

/// Where trackers are fetched from and how
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the reports site, without trailing slash
    pub base_url: String,

    /// Path of the tracker index, appended to `base_url`
    pub index_path: String,

    /// User agent string for HTTP requests
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl SourceConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: exodus::BASE_URL.to_string(),
            index_path: exodus::TRACKERS_INDEX_PATH.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
        }
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of detail pages fetched concurrently
    pub max_concurrent: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::MAX_CONCURRENT_WORKERS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.source.base_url)
            .map_err(|e| ConfigError::validation(format!("source.base_url {:?}: {e}", self.source.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::validation(format!(
                "source.base_url must start with http:// or https://: {:?}",
                self.source.base_url
            )));
        }

        if self.source.request_timeout_seconds == 0 {
            return Err(ConfigError::validation("source.request_timeout_seconds must be greater than 0"));
        }

        if self.workers.max_concurrent == 0 {
            return Err(ConfigError::validation("workers.max_concurrent must be greater than 0"));
        }

        EnvFilter::try_new(&self.logging.level)
            .map_err(|e| ConfigError::validation(format!("logging.level {:?}: {e}", self.logging.level)))?;

        Ok(())
    }
}

/// Loads [`AppConfig`] from file and environment layers
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    required: bool,
}

impl ConfigManager {
    /// Per-user configuration directory, e.g. `~/.config/trackers-block`
    #[must_use]
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(defaults::CONFIG_DIR_NAME))
    }

    /// Use `path` if given (it must exist), otherwise the per-user config
    /// file when present.
    #[must_use]
    pub fn new(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self {
                config_path: Some(path.to_path_buf()),
                required: true,
            },
            None => Self {
                config_path: Self::get_config_dir().map(|dir| dir.join(defaults::CONFIG_FILE_NAME)),
                required: false,
            },
        }
    }

    /// The file [`Self::load_config`] reads, if any.
    #[must_use]
    pub fn source_file(&self) -> Option<&Path> {
        self.config_path
            .as_deref()
            .filter(|path| self.required || path.exists())
    }

    /// Merge the file and environment layers. The result is not validated,
    /// callers apply their overrides first and then call [`AppConfig::validate`].
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = self.source_file() {
            builder = builder.add_source(config::File::from(path).required(self.required));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
