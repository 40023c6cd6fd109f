//! Common test utilities for wallpaper-dl integration tests

#![allow(dead_code)]

use serde_json::{Map, Value, json};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wallpaper_dl::{BatchDownloader, Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock feed is served from
pub const FEED_PATH: &str = "/media";

/// One image entry of a mock feed
pub struct MockImage {
    /// Record key in the feed's data map
    pub key: String,
    /// Path (and optional query) of the image on the mock server
    pub path: String,
    /// Status code the image responds with
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl MockImage {
    /// Image served with a 200 response
    pub fn ok(key: &str, path: &str, body: &[u8]) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_string(),
            status: 200,
            body: body.to_vec(),
        }
    }

    /// Image whose request fails with `status`
    pub fn failing(key: &str, path: &str, status: u16) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_string(),
            status,
            body: Vec::new(),
        }
    }
}

/// Build the feed document for `images` hosted on `server`
pub fn feed_document(server: &MockServer, images: &[MockImage]) -> Value {
    let mut data = Map::new();
    for image in images {
        data.insert(
            image.key.clone(),
            json!({ "dhd": format!("{}{}", server.uri(), image.path) }),
        );
    }
    json!({ "version": 1, "data": data })
}

/// Start a mock server serving a feed plus every image in it
///
/// Each image response is delayed by `delay`, so concurrent downloads overlap.
pub async fn start_feed_server(images: &[MockImage], delay: Duration) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_document(&server, images)))
        .mount(&server)
        .await;

    for image in images {
        // Query strings are not part of the matched path
        let image_path = image.path.split('?').next().unwrap_or(&image.path);
        Mock::given(method("GET"))
            .and(path(image_path))
            .respond_with(
                ResponseTemplate::new(image.status)
                    .set_body_bytes(image.body.clone())
                    .set_delay(delay),
            )
            .mount(&server)
            .await;
    }

    server
}

/// Create a downloader pointed at `server`'s feed, writing into a fresh temp directory
///
/// Returns the downloader and temp directory (keep temp_dir alive for test duration)
pub fn create_downloader(server: &MockServer, workers: usize) -> (BatchDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        source_url: format!("{}{}", server.uri(), FEED_PATH),
        download_dir: temp_dir.path().join("downloads"),
        workers,
        request_timeout: Some(Duration::from_secs(10)),
        ..Default::default()
    };

    let downloader = BatchDownloader::new(config).expect("Failed to create downloader");
    (downloader, temp_dir)
}

/// Sorted file names in `dir`, ignoring hidden staging files
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read download dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}
