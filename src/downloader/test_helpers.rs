//! Shared test helpers: an in-memory fetcher and downloader construction.

use crate::config::Config;
use crate::downloader::BatchDownloader;
use crate::error::FetchError;
use crate::fetch::HttpFetcher;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

/// Canned response for one URL
#[derive(Clone, Debug)]
pub(crate) enum FakeResponse {
    Body(Vec<u8>),
    Fail(String),
}

/// In-memory [`HttpFetcher`] serving canned bodies and failures
#[derive(Default)]
pub(crate) struct FakeFetcher {
    responses: HashMap<String, FakeResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Body(body.into()));
        self
    }

    pub(crate) fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Fail(reason.to_string()));
        self
    }

    /// Delay every response, so concurrent requests overlap
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were running at the same time
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(url) {
            Some(FakeResponse::Body(body)) => Ok(body.clone()),
            Some(FakeResponse::Fail(reason)) => Err(FetchError::Request {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Body served for `url` by [`fetcher_for`]
pub(crate) fn body_for(url: &str) -> Vec<u8> {
    format!("image bytes of {}", url).into_bytes()
}

/// Record map with `count` records, every `skip_every`-th one lacking the image field
///
/// Returns the map and the image URLs in enumeration order.
pub(crate) fn sample_records(count: usize, skip_every: usize) -> (Map<String, Value>, Vec<String>) {
    let mut records = Map::new();
    for i in 0..count {
        let key = format!("{:04}", i);
        let record = if skip_every > 0 && i % skip_every == 0 {
            json!({"title": format!("no image {}", i)})
        } else {
            let ext = if i % 2 == 0 { "png" } else { "jpg" };
            json!({"dhd": format!("http://img.test/{}.{}?w=1920", i, ext)})
        };
        records.insert(key, record);
    }

    let urls = records
        .values()
        .filter_map(|r| r.get("dhd").and_then(Value::as_str).map(str::to_string))
        .collect();
    (records, urls)
}

/// Fetcher serving [`body_for`] for every URL in `urls`
pub(crate) fn fetcher_for(urls: &[String]) -> FakeFetcher {
    urls.iter()
        .fold(FakeFetcher::new(), |f, url| f.with_body(url, body_for(url)))
}

/// Helper to create a test BatchDownloader writing into a temporary directory.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) fn create_test_downloader(
    fetcher: Arc<dyn HttpFetcher>,
) -> (BatchDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let config = Config {
        source_url: "http://feed.test/media".to_string(),
        download_dir: temp_dir.path().join("downloads"),
        workers: 4,
        ..Default::default()
    };

    (BatchDownloader::with_fetcher(config, fetcher), temp_dir)
}

/// Sorted file names in `dir`, ignoring hidden staging files
pub(crate) fn list_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}
