//! HTTP client module with retry logic and error handling.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable, classify_error};

use anyhow::{Context, Result};
use std::time::Duration;

/// User agent reported to the index.
const USER_AGENT: &str = concat!("pindex/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout for index calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Builds the network session used for one invocation.
///
/// The session is constructed once before the first query and released
/// when it goes out of scope on any exit path.
pub fn build_session() -> Result<HttpClient> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP session")?;
    Ok(HttpClient::new(client))
}
