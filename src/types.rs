//! Core types and events

use crate::error::DownloadError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A single unit of work: one image URL and the file it is saved to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Source image URL
    pub url: String,
    /// Destination file path
    pub destination: PathBuf,
}

impl Task {
    /// Create a new task
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }
}

/// Result of downloading one [`Task`]
#[must_use]
#[derive(Clone, Debug)]
pub struct DownloadOutcome {
    /// The task this outcome belongs to
    pub task: Task,
    /// Failure detail, `None` on success
    pub error: Option<DownloadError>,
    /// Number of bytes written (0 on failure)
    pub bytes: u64,
}

impl DownloadOutcome {
    /// Successful outcome
    pub fn success(task: Task, bytes: u64) -> Self {
        Self {
            task,
            error: None,
            bytes,
        }
    }

    /// Failed outcome
    pub fn failure(task: Task, error: DownloadError) -> Self {
        Self {
            task,
            error: Some(error),
            bytes: 0,
        }
    }

    /// Whether the image was saved
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-worker tally, merged when the pool is joined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Tasks that completed successfully
    pub succeeded: usize,
    /// Tasks that failed
    pub failed: usize,
    /// Total bytes written
    pub bytes: u64,
}

impl WorkerStats {
    /// Count one outcome
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
            self.bytes += outcome.bytes;
        } else {
            self.failed += 1;
        }
    }

    /// Combine two tallies
    pub fn merge(self, other: WorkerStats) -> WorkerStats {
        WorkerStats {
            succeeded: self.succeeded + other.succeeded,
            failed: self.failed + other.failed,
            bytes: self.bytes + other.bytes,
        }
    }
}

/// Summary of one batch run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tasks pushed into the queue
    pub queued: usize,
    /// Tasks downloaded successfully
    pub succeeded: usize,
    /// Tasks that failed
    pub failed: usize,
    /// Total bytes written
    pub bytes: u64,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether every queued task was downloaded
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.succeeded == self.queued
    }
}

/// Event emitted during a batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Image URL found and queued
    TaskQueued {
        /// 1-based position in enumeration order
        index: usize,
        /// Source image URL
        url: String,
        /// Destination file path
        destination: PathBuf,
    },

    /// Image saved
    DownloadComplete {
        /// Worker that handled the task
        worker: usize,
        /// Source image URL
        url: String,
        /// Destination file path
        destination: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// Image could not be downloaded or saved
    DownloadFailed {
        /// Worker that handled the task
        worker: usize,
        /// Source image URL
        url: String,
        /// Destination file path
        destination: PathBuf,
        /// Error message
        error: String,
    },

    /// Producer finished enumerating; no more tasks will be queued
    QueueClosed {
        /// Total tasks queued
        queued: usize,
    },

    /// All workers exited
    Finished {
        /// Run summary
        summary: RunSummary,
    },
}
