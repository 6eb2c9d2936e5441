//! Application use cases
//!
//! Collect → sort → render → save, independent of where pages come from.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::application::export::OutputFormat;
use crate::application::tracker_collector::{CollectOptions, CollectSummary, TrackerCollector};
use crate::domain::{Tracker, sort_by_name};
use crate::infrastructure::{TrackerSource, write_atomically};

/// One export run as requested on the command line
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: OutputFormat,
    pub destination: PathBuf,
    pub options: CollectOptions,
}

/// What an export run produced
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub trackers: Vec<Tracker>,
    pub summary: CollectSummary,
    pub total_urls: usize,
}

pub struct ExportTrackersUseCase {
    collector: TrackerCollector,
}

impl ExportTrackersUseCase {
    pub fn new(source: Arc<dyn TrackerSource>) -> Result<Self> {
        Ok(Self {
            collector: TrackerCollector::new(source)?,
        })
    }

    pub async fn execute(&self, request: &ExportRequest) -> Result<ExportReport> {
        let (mut trackers, summary) = self
            .collector
            .collect_with_summary(request.options)
            .await
            .context("Failed to collect trackers")?;

        sort_by_name(&mut trackers);

        let total_urls: usize = trackers.iter().map(|t| t.urls.len()).sum();
        info!("Found total {} trackers and {} urls", trackers.len(), total_urls);
        info!("Saving {} to {}...", request.format, request.destination.display());

        let rendered = request
            .format
            .render(&trackers)
            .with_context(|| format!("Failed to render {} output", request.format))?;

        write_atomically(&request.destination, &rendered)
            .await
            .with_context(|| format!("Failed to write {}", request.destination.display()))?;

        info!("Successfully saved!");

        Ok(ExportReport {
            trackers,
            summary,
            total_urls,
        })
    }
}
