//! HTTP fetching behind a trait, so the pipeline can run against fakes in tests.

use crate::config::Config;
use crate::error::{Error, FetchError};
use async_trait::async_trait;
use std::time::Duration;

/// Abstraction over "GET this URL and give me the whole body"
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url`, buffering the full response body in memory
    ///
    /// Returns [`FetchError::Request`] when the request does not complete and
    /// [`FetchError::Status`] for non-success HTTP status codes.
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Production [`HttpFetcher`] backed by a shared `reqwest` client
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher with an optional per-request timeout and a user agent
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Build a fetcher from the run configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Self::new(config.request_timeout, &config.user_agent)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(url, &e))?;

        Ok(body.to_vec())
    }
}

fn request_error(url: &str, e: &reqwest::Error) -> FetchError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchError::Request {
        url: url.to_string(),
        reason,
    }
}
