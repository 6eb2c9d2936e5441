//! Test utilities
//!
//! An in-memory [`TrackerSource`] serving canned pages, with optional
//! per-page latency and a record of peak concurrency.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::infrastructure::{HttpError, TrackerSource};

pub const TEST_BASE_URL: &str = "https://reports.test";

/// Canned response for one path
#[derive(Debug, Clone)]
enum Page {
    Body(String),
    Status(StatusCode),
}

#[derive(Debug, Default)]
pub struct FakeSource {
    index: Option<Page>,
    pages: HashMap<String, Page>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requested: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, html: impl Into<String>) -> Self {
        self.index = Some(Page::Body(html.into()));
        self
    }

    pub fn with_index_status(mut self, status: StatusCode) -> Self {
        self.index = Some(Page::Status(status));
        self
    }

    pub fn with_page(mut self, path: &str, html: impl Into<String>) -> Self {
        self.pages.insert(path.to_string(), Page::Body(html.into()));
        self
    }

    pub fn with_status(mut self, path: &str, status: StatusCode) -> Self {
        self.pages.insert(path.to_string(), Page::Status(status));
        self
    }

    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Option<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackerSource for FakeSource {
    fn base_url(&self) -> &str {
        TEST_BASE_URL
    }

    async fn fetch(&self, path: Option<&str>) -> Result<String, HttpError> {
        self.requested.lock().unwrap().push(path.map(ToString::to_string));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = path.and_then(|p| self.delays.get(p)).copied().unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = format!("{TEST_BASE_URL}{}", path.unwrap_or("/index"));
        let page = match path {
            None => self.index.clone(),
            Some(p) => self.pages.get(p).cloned(),
        };

        match page {
            Some(Page::Body(body)) => Ok(body),
            Some(Page::Status(status)) => Err(HttpError::Status { status, url }),
            None => Err(HttpError::Status {
                status: StatusCode::NOT_FOUND,
                url,
            }),
        }
    }
}

/// Index page with one `div.trackers` block per `(link, name)` pair
pub fn index_page(entries: &[(&str, &str)]) -> String {
    let blocks: String = entries
        .iter()
        .map(|(link, name)| format!(r#"<div class="trackers"><p><a href="{link}">{name}&nbsp;<span>42</span></a></p></div>"#))
        .collect();
    format!("<html><body>{blocks}</body></html>")
}

/// Detail page whose network detection rule is `rule`
pub fn detail_page(rule: &str) -> String {
    format!(
        r#"<html><body><div class="col-md-8">
            <p><code>com.example.sdk</code></p>
            <p><code>{rule}</code></p>
        </div></body></html>"#
    )
}
