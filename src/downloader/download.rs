//! Single-image download: fetch the body, then persist it.

use std::sync::Arc;

use crate::error::DownloadError;
use crate::fetch::HttpFetcher;
use crate::types::{DownloadOutcome, Task};
use crate::utils::write_atomic;

/// Stateless per-task downloader shared by every worker
///
/// Failures are reported on the returned [`DownloadOutcome`], never as an `Err`.
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn HttpFetcher>,
}

impl Downloader {
    /// Create a downloader using `fetcher` for HTTP
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `task.url` and write the body to `task.destination`
    ///
    /// On a transport error nothing is written. On a storage error the
    /// destination is left as it was before the call.
    pub async fn download(&self, task: Task) -> DownloadOutcome {
        let body = match self.fetcher.fetch(&task.url).await {
            Ok(body) => body,
            Err(e) => {
                let error = DownloadError::Transport {
                    url: task.url.clone(),
                    reason: e.to_string(),
                };
                return DownloadOutcome::failure(task, error);
            }
        };

        if let Err(e) = write_atomic(&task.destination, &body).await {
            let error = DownloadError::Storage {
                path: task.destination.clone(),
                reason: e.to_string(),
            };
            return DownloadOutcome::failure(task, error);
        }

        DownloadOutcome::success(task, body.len() as u64)
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader").finish_non_exhaustive()
    }
}
