//! Configuration types for wallpaper-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Feed endpoint used when no URL is configured
pub const DEFAULT_SOURCE_URL: &str =
    "https://storage.googleapis.com/panels-api/data/20240916/media-1a-i-p~s";

/// Main configuration for [`BatchDownloader`](crate::BatchDownloader)
///
/// Every field has a serde default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// URL of the JSON feed describing the media collection
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Directory images are written to (default: "downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Number of concurrent download workers (default: 8)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-request timeout (default: 60 seconds, None = wait forever)
    #[serde(default = "default_request_timeout", with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,

    /// Field inside each record that holds the image URL (default: "dhd")
    #[serde(default = "default_image_field")]
    pub image_field: String,

    /// Top-level key holding the record map (default: "data")
    #[serde(default = "default_data_key")]
    pub data_key: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            download_dir: default_download_dir(),
            workers: default_workers(),
            request_timeout: default_request_timeout(),
            image_field: default_image_field(),
            data_key: default_data_key(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The result is validated.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.source_url)
            .map_err(|e| Error::config("source_url", format!("invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "source_url",
                format!("unsupported URL scheme '{}'", parsed.scheme()),
            ));
        }

        if self.workers == 0 {
            return Err(Error::config("workers", "at least one worker is required"));
        }

        if self.image_field.is_empty() {
            return Err(Error::config("image_field", "must not be empty"));
        }

        if self.data_key.is_empty() {
            return Err(Error::config("data_key", "must not be empty"));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::config(
                "request_timeout",
                "must be greater than zero (omit it to disable)",
            ));
        }

        Ok(())
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_workers() -> usize {
    8
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_image_field() -> String {
    "dhd".to_string()
}

fn default_data_key() -> String {
    "data".to_string()
}

fn default_user_agent() -> String {
    concat!("wallpaper-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
