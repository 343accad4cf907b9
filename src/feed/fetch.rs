// src/feed/fetch.rs
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::parse::{parse_feed, ParsedFeed};

/// Client identifier sent with every feed request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Why a single feed contributed nothing to this run. These never abort
/// the run; the aggregator records them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("unparsable feed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e)
        }
    }
}

/// HTTP feed retrieval with a bounded timeout. One attempt per feed,
/// no retries. Cheap to clone per run; holds only the reqwest client.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Fetch and parse one feed. Any failure (network, non-2xx,
    /// malformed body) comes back as a [`FetchError`].
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError> {
        debug!(url, "fetching feed");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = resp.text().await?;
        let parsed = parse_feed(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        debug!(url, entries = parsed.entries.len(), "feed parsed");
        Ok(parsed)
    }
}
