//! # wallpaper-dl
//!
//! Concurrent batch downloader for image collections described by a JSON feed.
//!
//! ## How a run works
//!
//! 1. The feed is fetched and decoded; the object under `data` maps ids to records
//! 2. Each record with an image URL (the `dhd` field by default) becomes a task
//!    named `1.jpg`, `2.png`, ... in enumeration order
//! 3. A fixed pool of workers pulls tasks from a FIFO queue and saves each image
//! 4. The producer closes the queue after the last task; the run ends when every
//!    worker has drained it
//!
//! A failed image only affects its own outcome. Only feed errors abort a run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wallpaper_dl::{BatchDownloader, Config, Event};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         download_dir: "wallpapers".into(),
//!         workers: 4,
//!         ..Default::default()
//!     };
//!
//!     let downloader = BatchDownloader::new(config)?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader.run().await?;
//!     println!("{} of {} images saved", summary.succeeded, summary.queued);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Batch download pipeline (queue, workers, orchestration)
pub mod downloader;
/// Error types
pub mod error;
/// Feed document decoding
pub mod feed;
/// HTTP fetching
pub mod fetch;
/// Image URL enumeration and naming
pub mod locator;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::{BatchDownloader, Downloader, TaskQueue, WorkerPool};
pub use error::{DownloadError, Error, FetchError, Result};
pub use fetch::{HttpFetcher, ReqwestFetcher};
pub use locator::{ImageLocator, locate, locate_field};
pub use types::{DownloadOutcome, Event, RunSummary, Task, WorkerStats};
