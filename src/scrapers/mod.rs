//! Fetchers for every access method in the source registry.
//!
//! Each fetcher makes a single attempt and returns an owned, bounded list of
//! [`Item`]s or a [`FetchError`] describing why the source contributed
//! nothing. Failures never cross the per-source boundary: the orchestrator
//! logs them and moves on.
//!
//! # Supported Methods
//!
//! | Method | Module | Notes |
//! |--------|--------|-------|
//! | Feed pull | [`feed`] | RSS/Atom via `feed-rs`, up to 10 candidates |
//! | Keyword search | [`search`] | Embedded JSON blob in the search results page |
//! | Page scrape | [`page`] | Per-site heuristics over anchors and headings |

pub mod feed;
pub mod page;
pub mod search;

use crate::models::{Item, MAX_ITEMS_PER_SOURCE};
use crate::sources::{AccessMethod, Source};
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Desktop-browser User-Agent sent with every request.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a source contributed zero items.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("feed parse failure: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("embedded data did not match the expected shape: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected document shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e)
        } else {
            FetchError::Transport(e)
        }
    }
}

impl FetchError {
    /// Coarse failure class for logging: `timeout`, `transport` or `parse`.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Transport(_) | FetchError::Status { .. } => "transport",
            FetchError::Feed(_) | FetchError::Json(_) | FetchError::Shape(_) => "parse",
        }
    }
}

/// Build the shared HTTP client.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// GET `url` and return the body, treating non-2xx as a failure.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { status: status.as_u16() });
    }
    Ok(resp.text().await?)
}

/// GET `url` and return the raw bytes, treating non-2xx as a failure.
pub(crate) async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { status: status.as_u16() });
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Poll one registry row with the fetcher matching its access method.
///
/// The result never holds more than [`MAX_ITEMS_PER_SOURCE`] items.
#[instrument(level = "info", skip_all, fields(source = source.key))]
pub async fn fetch_source(client: &Client, source: &Source) -> Result<Vec<Item>, FetchError> {
    let now = Utc::now();
    let mut items = match source.method {
        AccessMethod::Feed { url } => {
            feed::fetch(client, source.key, url, source.max_age_days, now).await?
        }
        AccessMethod::KeywordSearch { query } => {
            let max_age = source.max_age_days.unwrap_or(search::DEFAULT_MAX_AGE_DAYS);
            search::fetch(client, source.key, query, max_age, now).await?
        }
        AccessMethod::Scrape { url, site } => page::fetch(client, source.key, url, site).await?,
    };
    items.truncate(MAX_ITEMS_PER_SOURCE);
    debug!(count = items.len(), "Source fetched");
    Ok(items)
}
