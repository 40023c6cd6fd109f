//! Batch download pipeline split into focused submodules.
//!
//! - [`queue`] - FIFO task queue with the producer's "done" signal
//! - [`download`] - Single task fetch-and-persist
//! - [`pool`] - Fixed-size worker pool draining the queue
//!
//! [`BatchDownloader`] ties them together: it fetches the feed, starts the pool,
//! feeds it tasks as they are found and waits for the queue to drain.

mod download;
mod pool;
mod queue;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use download::Downloader;
pub use pool::WorkerPool;
pub use queue::TaskQueue;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::parse_document;
use crate::fetch::{HttpFetcher, ReqwestFetcher};
use crate::locator::ImageLocator;
use crate::types::{Event, RunSummary, Task};
use crate::utils::numbered_filename;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct BatchDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// HTTP implementation used for the feed and every image
    pub(crate) fetcher: Arc<dyn HttpFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl BatchDownloader {
    /// Create a downloader that talks HTTP through `reqwest`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = ReqwestFetcher::from_config(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a downloader with a custom [`HttpFetcher`]
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            fetcher,
            event_tx,
        }
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the feed and run the whole batch using the configured settings
    ///
    /// # Errors
    ///
    /// Fails before any download starts if the feed cannot be fetched or decoded,
    /// or if the download directory cannot be created. Individual image failures
    /// are counted in the summary instead.
    pub async fn run(&self) -> Result<RunSummary> {
        let records = self.fetch_document().await?;
        self.execute(&records, &self.config.download_dir, self.config.workers)
            .await
    }

    /// Fetch the feed and return the record map under the configured data key
    pub async fn fetch_document(&self) -> Result<Map<String, Value>> {
        let url = &self.config.source_url;
        tracing::info!(url = %url, "Fetching feed");

        let body = self.fetcher.fetch(url).await?;
        let records = parse_document(&body, &self.config.data_key)?;

        tracing::info!(records = records.len(), "Feed decoded");
        Ok(records)
    }

    /// Download every image referenced by `records` into `destination_dir`
    ///
    /// Workers are started before enumeration, so downloads begin while later
    /// tasks are still being queued. Returns once every worker has exited.
    ///
    /// # Errors
    ///
    /// Returns an error if `worker_count` is zero or the directory cannot be created.
    pub async fn execute(
        &self,
        records: &Map<String, Value>,
        destination_dir: &Path,
        worker_count: usize,
    ) -> Result<RunSummary> {
        if worker_count == 0 {
            return Err(Error::config("workers", "at least one worker is required"));
        }

        let started = Instant::now();
        ensure_directory(destination_dir).await?;

        let queue = Arc::new(TaskQueue::new());
        let downloader = Arc::new(Downloader::new(Arc::clone(&self.fetcher)));
        let pool = WorkerPool::spawn(
            Arc::clone(&queue),
            downloader,
            worker_count,
            self.event_tx.clone(),
        );
        tracing::info!(
            workers = pool.worker_count(),
            dir = %destination_dir.display(),
            "Download workers started"
        );

        let produced = self.enqueue_all(&queue, records, destination_dir).await;

        // Close the queue even if enqueueing failed so the workers can exit
        queue.mark_done().await;
        let stats = pool.join().await;
        let queued = produced?;

        let summary = RunSummary {
            queued,
            succeeded: stats.succeeded,
            failed: stats.failed,
            bytes: stats.bytes,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            queued = summary.queued,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Batch finished"
        );
        self.event_tx
            .send(Event::Finished {
                summary: summary.clone(),
            })
            .ok();

        Ok(summary)
    }

    /// Producer side: push every located task in enumeration order
    async fn enqueue_all(
        &self,
        queue: &TaskQueue,
        records: &Map<String, Value>,
        destination_dir: &Path,
    ) -> Result<usize> {
        let mut queued = 0;

        for (index, url) in ImageLocator::new(records, &self.config.image_field) {
            let destination = destination_dir.join(numbered_filename(index, url));

            // Announce before pushing so subscribers see it ahead of the outcome
            self.event_tx
                .send(Event::TaskQueued {
                    index,
                    url: url.to_string(),
                    destination: destination.clone(),
                })
                .ok();

            queue.push(Task::new(url, destination)).await?;
            queued += 1;
        }

        tracing::debug!(queued, "All tasks queued");
        self.event_tx.send(Event::QueueClosed { queued }).ok();
        Ok(queued)
    }
}

/// Create `dir` (and parents) if it does not exist yet
async fn ensure_directory(dir: &Path) -> Result<()> {
    if tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(());
    }

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create download directory '{}': {}",
                dir.display(),
                e
            ),
        ))
    })?;

    tracing::info!(dir = %dir.display(), "Created download directory");
    Ok(())
}
