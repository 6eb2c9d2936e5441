//! Two-phase tracker collection
//!
//! The index page is fetched once; then every tracker's detail page is
//! fetched by its own task, admitted through a semaphore so at most
//! `workers` requests are in flight. Task results are gathered at a single
//! point, so no task ever writes to shared state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tracing::{debug, error, info, warn};

use crate::domain::{Tracker, TrackerIndexEntry, is_valid_hostname};
use crate::infrastructure::parsing::{HtmlParser, ParsingConfig};
use crate::infrastructure::{HttpError, ParsingError, TrackerDetailParser, TrackerListParser, TrackerSource};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Extraction(#[from] ParsingError),

    #[error("worker pool closed: {0}")]
    WorkerPool(#[from] AcquireError),
}

/// Options for one collection run
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Maximum number of detail pages fetched concurrently
    pub workers: NonZeroUsize,
    /// Leave out trackers without any valid hostname
    pub skip_empty: bool,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub collected: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

/// Drives index and detail fetches against a [`TrackerSource`]
pub struct TrackerCollector {
    source: Arc<dyn TrackerSource>,
    list_parser: TrackerListParser,
    detail_parser: Arc<TrackerDetailParser>,
}

impl TrackerCollector {
    pub fn new(source: Arc<dyn TrackerSource>) -> Result<Self, CollectError> {
        Self::with_parsing_config(source, &ParsingConfig::default())
    }

    pub fn with_parsing_config(source: Arc<dyn TrackerSource>, config: &ParsingConfig) -> Result<Self, CollectError> {
        Ok(Self::with_parsers(
            source,
            TrackerListParser::with_config(&config.tracker_list_selectors)?,
            TrackerDetailParser::with_config(&config.tracker_detail_selectors)?,
        ))
    }

    pub fn with_parsers(
        source: Arc<dyn TrackerSource>,
        list_parser: TrackerListParser,
        detail_parser: TrackerDetailParser,
    ) -> Self {
        Self {
            source,
            list_parser,
            detail_parser: Arc::new(detail_parser),
        }
    }

    /// Collect every tracker listed on the index page, unsorted.
    ///
    /// Failing to fetch or parse the index aborts the run. A tracker whose
    /// detail page fails is logged and left out; the others still complete.
    pub async fn collect(&self, options: CollectOptions) -> Result<Vec<Tracker>, CollectError> {
        let (trackers, _) = self.collect_with_summary(options).await?;
        Ok(trackers)
    }

    pub async fn collect_with_summary(&self, options: CollectOptions) -> Result<(Vec<Tracker>, CollectSummary), CollectError> {
        let index_html = self.source.fetch(None).await?;
        let entries = self.list_parser.parse(&index_html)?;

        let semaphore = Arc::new(Semaphore::new(options.workers.get()));
        let mut names = Vec::with_capacity(entries.len());
        let mut tasks = Vec::with_capacity(entries.len());

        debug!("Dispatching {} trackers to {} workers", entries.len(), options.workers);

        for entry in entries {
            let source = Arc::clone(&self.source);
            let parser = Arc::clone(&self.detail_parser);
            let semaphore = Arc::clone(&semaphore);
            names.push(entry.display_name.clone());

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                collect_tracker(source.as_ref(), &parser, entry, options.skip_empty).await
            }));
        }

        let results = join_all(tasks).await;
        let mut trackers = Vec::with_capacity(results.len());
        let mut summary = CollectSummary::default();

        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(Ok(Some(tracker))) => {
                    trackers.push(tracker);
                    summary.collected += 1;
                }
                Ok(Ok(None)) => summary.skipped_empty += 1,
                Ok(Err(e)) => {
                    warn!("Skipping tracker {:?}: {}", name, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Task for tracker {:?} did not complete: {}", name, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Collected {} trackers ({} skipped as empty, {} failed)",
            summary.collected, summary.skipped_empty, summary.failed
        );

        Ok((trackers, summary))
    }
}

/// Fetch one detail page and build its record, or `None` when it is empty
/// and empty trackers are skipped.
async fn collect_tracker(
    source: &dyn TrackerSource,
    parser: &TrackerDetailParser,
    entry: TrackerIndexEntry,
    skip_empty: bool,
) -> Result<Option<Tracker>, CollectError> {
    let html = source.fetch(Some(&entry.relative_link)).await?;
    let candidates = parser.parse(&html)?;

    let urls: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| {
            let valid = is_valid_hostname(candidate);
            if !valid && !candidate.is_empty() {
                debug!("Rejected {:?} for {}", candidate, entry.display_name);
            }
            valid
        })
        .collect();

    info!("Found {} urls for {}", urls.len(), entry.display_name);

    let exodus_link = format!("{}{}", source.base_url(), entry.relative_link);
    let tracker = Tracker::new(entry.display_name, urls, exodus_link);

    if skip_empty && !tracker.has_urls() {
        return Ok(None);
    }
    Ok(Some(tracker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sort_by_name;
    use crate::test_utils::{FakeSource, TEST_BASE_URL, detail_page, index_page};
    use reqwest::StatusCode;
    use std::time::Duration;

    fn options(workers: usize, skip_empty: bool) -> CollectOptions {
        CollectOptions {
            workers: NonZeroUsize::new(workers).unwrap(),
            skip_empty,
        }
    }

    async fn collect(source: FakeSource, options: CollectOptions) -> Result<(Vec<Tracker>, CollectSummary), CollectError> {
        TrackerCollector::new(Arc::new(source)).unwrap().collect_with_summary(options).await
    }

    #[tokio::test]
    async fn test_builds_records_from_index_and_details() {
        let source = FakeSource::new()
            .with_index(index_page(&[("/en/trackers/1/", "Adjust"), ("/en/trackers/2/", "Branch")]))
            .with_page("/en/trackers/1/", detail_page(r"app\.adjust\.com|adjust\.io|not a host"))
            .with_page("/en/trackers/2/", detail_page(r"api\.branch\.io"));

        let (mut trackers, summary) = collect(source, options(4, false)).await.unwrap();
        sort_by_name(&mut trackers);

        assert_eq!(
            trackers,
            vec![
                Tracker::new(
                    "Adjust".to_string(),
                    vec!["app.adjust.com".to_string(), "adjust.io".to_string()],
                    format!("{TEST_BASE_URL}/en/trackers/1/"),
                ),
                Tracker::new(
                    "Branch".to_string(),
                    vec!["api.branch.io".to_string()],
                    format!("{TEST_BASE_URL}/en/trackers/2/"),
                ),
            ]
        );
        assert_eq!(summary, CollectSummary { collected: 2, skipped_empty: 0, failed: 0 });
    }

    #[tokio::test]
    async fn test_skip_empty_drops_trackers_without_valid_hosts() {
        let index = index_page(&[("/t/1/", "Empty"), ("/t/2/", "Full")]);
        let build = || {
            FakeSource::new()
                .with_index(index.clone())
                .with_page("/t/1/", detail_page(r"localhost|bad_host\.com"))
                .with_page("/t/2/", detail_page(r"ok\.example\.com"))
        };

        let (kept, summary) = collect(build(), options(2, true)).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Full");
        assert_eq!(summary.skipped_empty, 1);

        let (all, _) = collect(build(), options(2, false)).await.unwrap();
        let empty = all.iter().find(|t| t.name == "Empty").unwrap();
        assert!(empty.urls.is_empty());
    }

    #[tokio::test]
    async fn test_failed_detail_pages_do_not_abort_siblings() {
        let source = FakeSource::new()
            .with_index(index_page(&[("/t/1/", "Unreachable"), ("/t/2/", "Changed markup"), ("/t/3/", "Fine")]))
            .with_status("/t/1/", StatusCode::BAD_GATEWAY)
            .with_page("/t/2/", "<html><body><p>redesigned</p></body></html>")
            .with_page("/t/3/", detail_page(r"fine\.example\.com"));

        let (trackers, summary) = collect(source, options(3, false)).await.unwrap();

        assert_eq!(trackers.len(), 1);
        assert_eq!(trackers[0].name, "Fine");
        assert_eq!(summary, CollectSummary { collected: 1, skipped_empty: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_index_failure_is_fatal() {
        let source = FakeSource::new().with_index_status(StatusCode::SERVICE_UNAVAILABLE);

        let result = collect(source, options(1, false)).await;
        assert!(matches!(result, Err(CollectError::Transport(HttpError::Status { .. }))));
    }

    #[tokio::test]
    async fn test_worker_count_bounds_concurrency() {
        let entries: Vec<(String, String)> = (0..12).map(|i| (format!("/t/{i}/"), format!("Tracker {i}"))).collect();
        let refs: Vec<(&str, &str)> = entries.iter().map(|(l, n)| (l.as_str(), n.as_str())).collect();

        let mut source = FakeSource::new().with_index(index_page(&refs));
        for (link, _) in &entries {
            source = source
                .with_page(link, detail_page(r"a\.example\.com"))
                .with_delay(link, Duration::from_millis(20));
        }
        let source = Arc::new(source);

        let collector = TrackerCollector::new(source.clone()).unwrap();
        let trackers = collector.collect(options(3, false)).await.unwrap();

        assert_eq!(trackers.len(), 12);
        assert_eq!(source.peak_in_flight(), 3, "detail fetches should fill every permit");
        assert_eq!(source.requested()[0], None, "index must be fetched first");
    }

    #[tokio::test]
    async fn test_sorted_output_ignores_completion_order() {
        let source = FakeSource::new()
            .with_index(index_page(&[("/t/c/", "Charlie"), ("/t/a/", "Alpha"), ("/t/b/", "Bravo")]))
            .with_page("/t/c/", detail_page(r"c\.example\.com"))
            .with_page("/t/a/", detail_page(r"a\.example\.com"))
            .with_page("/t/b/", detail_page(r"b\.example\.com"))
            .with_delay("/t/a/", Duration::from_millis(60))
            .with_delay("/t/b/", Duration::from_millis(30))
            .with_delay("/t/c/", Duration::from_millis(1));

        let (mut trackers, _) = collect(source, options(3, false)).await.unwrap();
        sort_by_name(&mut trackers);

        let names: Vec<&str> = trackers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[tokio::test]
    async fn test_custom_selectors() {
        let mut config = ParsingConfig::default();
        config.tracker_detail_selectors.code_block = "pre.rule".to_string();
        config.tracker_detail_selectors.hostnames_position = 0;

        let source = FakeSource::new()
            .with_index(index_page(&[("/t/1/", "Custom")]))
            .with_page("/t/1/", r#"<pre class="rule">custom\.example\.com</pre>"#);

        let collector = TrackerCollector::with_parsing_config(Arc::new(source), &config).unwrap();
        let trackers = collector.collect(options(1, false)).await.unwrap();

        assert_eq!(trackers[0].urls, vec!["custom.example.com"]);
    }

    #[tokio::test]
    async fn test_empty_index_yields_no_trackers() {
        let source = FakeSource::new().with_index("<html><body></body></html>");

        let (trackers, summary) = collect(source, options(16, true)).await.unwrap();
        assert!(trackers.is_empty());
        assert_eq!(summary, CollectSummary::default());
    }
}
