//! Application layer module
//!
//! Orchestrates collection and export on top of the infrastructure layer.

pub mod export;
pub mod tracker_collector;
pub mod use_cases;

pub use export::{ExportError, OutputFormat};
pub use tracker_collector::{CollectError, CollectOptions, CollectSummary, TrackerCollector};
pub use use_cases::{ExportReport, ExportRequest, ExportTrackersUseCase};
