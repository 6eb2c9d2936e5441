//! Command line entry point
//!
//! Flags override whatever the configuration layers resolved.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::application::{CollectOptions, ExportRequest, ExportTrackersUseCase, OutputFormat};
use crate::infrastructure::{AppConfig, ConfigManager, HttpClient, init_logging};

/// Parse trackers from exodus-privacy.eu.org and transform them to conf files
#[derive(Debug, Clone, Parser)]
#[command(name = "trackers-block", version, about)]
pub struct Cli {
    /// Format to transform the output into
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub transform_to: OutputFormat,

    /// Parse workers [default: 16]
    #[arg(long, value_name = "N")]
    pub workers: Option<NonZeroUsize>,

    /// Skip trackers with no URLs
    #[arg(long)]
    pub skip_empty: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug"
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Path to save the transformed output
    pub path: PathBuf,
}

impl Cli {
    /// Load configuration layers and apply command line overrides on top.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = ConfigManager::new(self.config.as_deref())
            .load_config()
            .context("Failed to load configuration")?;

        if let Some(workers) = self.workers {
            config.workers.max_concurrent = workers.get();
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(log_file) = &self.log_file {
            config.logging.log_file = Some(log_file.clone());
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn export_request(&self, config: &AppConfig) -> Result<ExportRequest> {
        let workers = NonZeroUsize::new(config.workers.max_concurrent).context("workers must be greater than 0")?;

        Ok(ExportRequest {
            format: self.transform_to,
            destination: self.path.clone(),
            options: CollectOptions {
                workers,
                skip_empty: self.skip_empty,
            },
        })
    }
}

/// Run the tool end to end against the live reports site.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let _log_guard = init_logging(&config.logging)?;
    if let Some(path) = ConfigManager::new(cli.config.as_deref()).source_file() {
        info!("Loaded configuration from {}", path.display());
    }
    debug!("Resolved configuration: {:?}", config);

    let client = HttpClient::with_config(&config.source)?;
    let request = cli.export_request(&config)?;

    ExportTrackersUseCase::new(Arc::new(client))?.execute(&request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_original_flags() {
        let cli = Cli::try_parse_from(["trackers-block", "--transform-to", "dnsmasq", "--workers", "4", "--skip-empty", "out.conf"]).unwrap();

        assert_eq!(cli.transform_to, OutputFormat::Dnsmasq);
        assert_eq!(cli.workers, NonZeroUsize::new(4));
        assert!(cli.skip_empty);
        assert_eq!(cli.path, PathBuf::from("out.conf"));
    }

    #[test]
    fn test_format_is_required() {
        assert!(Cli::try_parse_from(["trackers-block", "out.json"]).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["trackers-block", "--transform-to", "yaml", "out.yaml"]).is_err());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["trackers-block", "--transform-to", "json", "--workers", "0", "out.json"]).is_err());
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["trackers-block", "--transform-to", "csv"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[workers]\nmax_concurrent = 4\n").unwrap();

        let cli = Cli::try_parse_from([
            "trackers-block",
            "--transform-to",
            "json",
            "--config",
            config_path.to_str().unwrap(),
            "--workers",
            "9",
            "--log-level",
            "debug",
            "out.json",
        ])
        .unwrap();

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.workers.max_concurrent, 9);
        assert_eq!(config.logging.level, "debug");

        let request = cli.export_request(&config).unwrap();
        assert_eq!(request.options.workers.get(), 9);
        assert!(!request.options.skip_empty);
        assert_eq!(request.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_file_workers_used_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[workers]\nmax_concurrent = 4\n").unwrap();

        let cli = Cli::try_parse_from(["trackers-block", "--transform-to", "csv", "--config", config_path.to_str().unwrap(), "out.csv"]).unwrap();

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.workers.max_concurrent, 4);
    }

    #[test]
    fn test_flag_replaces_invalid_config_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[workers]\nmax_concurrent = 0\n\n[logging]\nlevel = \"trackers_block=loudest\"\n").unwrap();
        let config_arg = config_path.to_str().unwrap();

        let cli = Cli::try_parse_from([
            "trackers-block",
            "--transform-to",
            "json",
            "--config",
            config_arg,
            "--workers",
            "4",
            "--log-level",
            "debug",
            "out.json",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.workers.max_concurrent, 4);
        assert_eq!(config.logging.level, "debug");

        let without_flags = Cli::try_parse_from(["trackers-block", "--transform-to", "json", "--config", config_arg, "out.json"]).unwrap();
        assert!(without_flags.resolve_config().is_err());
    }
}
