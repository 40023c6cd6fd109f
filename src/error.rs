//! Error types for wallpaper-dl
//!
//! Errors are split by how far they are allowed to travel:
//! - [`Error`] and [`FetchError`] are fatal and stop a run before any image is downloaded
//! - [`DownloadError`] belongs to a single task and never leaves the worker that hit it

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wallpaper-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wallpaper-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "workers")
        key: Option<String>,
    },

    /// The feed document could not be retrieved or understood
    #[error("feed error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A task was pushed after the producer marked the queue as done
    #[error("task queue is closed: no more tasks can be added")]
    QueueClosed,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code, used in log fields
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Fetch(e) => match e {
                FetchError::Request { .. } => "feed_request_failed",
                FetchError::Status { .. } => "feed_bad_status",
                FetchError::InvalidJson(_) => "feed_invalid_json",
                FetchError::MissingKey(_) => "feed_missing_key",
                FetchError::NotAnObject(_) => "feed_not_an_object",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::QueueClosed => "queue_closed",
            Error::Other(_) => "internal_error",
        }
    }
}

/// Failures while retrieving or decoding the feed document
///
/// All of these abort the run before the worker pool starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete (connection refused, timeout, DNS, ...)
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The URL that was requested
        url: String,
        /// Transport error message
        reason: String,
    },

    /// The server answered with a non-success HTTP status
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// The URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The body is not valid JSON
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),

    /// The document has no section under the expected key
    #[error("document is missing the '{0}' section")]
    MissingKey(String),

    /// The value under the expected key is not a JSON object
    #[error("'{0}' section is not a JSON object")]
    NotAnObject(String),
}

/// Per-task download failures
///
/// These are recorded on the task's outcome and logged; they never stop other workers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// The image could not be fetched
    #[error("transport error for {url}: {reason}")]
    Transport {
        /// The image URL
        url: String,
        /// Transport error message
        reason: String,
    },

    /// The image was fetched but could not be written to disk
    #[error("storage error for {}: {reason}", path.display())]
    Storage {
        /// The destination path
        path: PathBuf,
        /// Filesystem error message
        reason: String,
    },
}

impl DownloadError {
    /// Whether the failure happened on the network side
    pub fn is_transport(&self) -> bool {
        matches!(self, DownloadError::Transport { .. })
    }

    /// Whether the failure happened while writing the file
    pub fn is_storage(&self) -> bool {
        matches!(self, DownloadError::Storage { .. })
    }
}
