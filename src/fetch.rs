use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("appstore_scraper/", env!("CARGO_PKG_VERSION"));

/// A page retrieval that did not produce a document.
#[derive(Debug, Error)]
#[error("request for {url} failed")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: reqwest::Error,
}

/// Build the shared HTTP client used by all workers.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Fetch one storefront page and return its body. Non-2xx statuses are
/// fetch errors; there is no retry and no caching.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let wrap = |source: reqwest::Error| FetchError {
        url: url.to_string(),
        source,
    };

    client
        .get(url)
        .send()
        .await
        .map_err(wrap)?
        .error_for_status()
        .map_err(wrap)?
        .text()
        .await
        .map_err(wrap)
}
