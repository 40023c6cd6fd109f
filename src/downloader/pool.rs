//! Worker pool: a fixed number of tasks draining the [`TaskQueue`].

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::download::Downloader;
use super::queue::TaskQueue;
use crate::types::{Event, WorkerStats};

/// Running set of download workers
///
/// Workers start as soon as the pool is spawned and exit once the queue is
/// closed and empty. [`join`](WorkerPool::join) waits for all of them.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Start `worker_count` workers pulling from `queue`
    pub fn spawn(
        queue: Arc<TaskQueue>,
        downloader: Arc<Downloader>,
        worker_count: usize,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        let handles = (1..=worker_count)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let downloader = Arc::clone(&downloader);
                let event_tx = event_tx.clone();
                tokio::spawn(run_worker(worker, queue, downloader, event_tx))
            })
            .collect();

        tracing::debug!(workers = worker_count, "Worker pool started");
        Self { handles }
    }

    /// Start a pool and wait for it to drain
    pub async fn run(
        queue: Arc<TaskQueue>,
        downloader: Arc<Downloader>,
        worker_count: usize,
        event_tx: broadcast::Sender<Event>,
    ) -> WorkerStats {
        Self::spawn(queue, downloader, worker_count, event_tx)
            .join()
            .await
    }

    /// Number of workers in the pool
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait until every worker has exited and merge their tallies
    ///
    /// A worker that panicked is logged and contributes nothing to the result.
    pub async fn join(self) -> WorkerStats {
        let mut total = WorkerStats::default();

        for (index, handle) in self.handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => total = total.merge(stats),
                Err(e) => {
                    tracing::error!(
                        worker = index + 1,
                        error = %e,
                        "Download worker terminated abnormally"
                    );
                }
            }
        }

        total
    }
}

async fn run_worker(
    worker: usize,
    queue: Arc<TaskQueue>,
    downloader: Arc<Downloader>,
    event_tx: broadcast::Sender<Event>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    while let Some(task) = queue.pop().await {
        tracing::debug!(worker, url = %task.url, "Downloading image");

        let outcome = downloader.download(task).await;
        stats.record(&outcome);

        let url = outcome.task.url;
        let destination = outcome.task.destination;
        match outcome.error {
            None => {
                tracing::info!(
                    worker,
                    path = %destination.display(),
                    bytes = outcome.bytes,
                    "Image saved"
                );
                event_tx
                    .send(Event::DownloadComplete {
                        worker,
                        url,
                        destination,
                        bytes: outcome.bytes,
                    })
                    .ok();
            }
            Some(error) => {
                tracing::warn!(
                    worker,
                    url = %url,
                    path = %destination.display(),
                    error = %error,
                    "Image download failed"
                );
                event_tx
                    .send(Event::DownloadFailed {
                        worker,
                        url,
                        destination,
                        error: error.to_string(),
                    })
                    .ok();
            }
        }
    }

    tracing::debug!(
        worker,
        succeeded = stats.succeeded,
        failed = stats.failed,
        "Worker exiting, queue drained"
    );
    stats
}
