//! HTTP client for the IMD portal.
//!
//! The portal serves server-rendered HTML only, so every fetch returns the raw
//! page text for the extractors. Failures are classified into [`FetchError`]
//! and never escape as panics.

use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use thiserror::Error;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Outcome of a failed upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server returned status code {0}")]
    Upstream(u16),
}

impl FetchError {
    /// HTTP-style status surfaced to API callers.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::Timeout => 504,
            FetchError::Network(_) => 500,
            FetchError::Upstream(status) => *status,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Client for the IMD station and alert pages.
#[derive(Debug, Clone)]
pub struct ImdClient {
    client: reqwest::Client,
    station_url_template: String,
    alerts_url: String,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

impl ImdClient {
    pub fn new(station_url_template: &str, alerts_url: &str, timeout: Duration) -> Self {
        // The portal presents a certificate that does not validate. Accepting
        // it is an explicit trust decision scoped to this client only.
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            station_url_template: station_url_template.to_string(),
            alerts_url: alerts_url.to_string(),
        }
    }

    pub fn station_url(&self, station_id: i64) -> String {
        self.station_url_template
            .replace("{id}", &station_id.to_string())
    }

    pub fn alerts_url(&self) -> &str {
        &self.alerts_url
    }

    /// Fetch one station's page.
    pub async fn fetch_station_page(&self, station_id: i64) -> Result<String, FetchError> {
        self.fetch(&self.station_url(station_id)).await
    }

    /// Fetch the national alerts page.
    pub async fn fetch_alerts_page(&self) -> Result<String, FetchError> {
        self.fetch(&self.alerts_url).await
    }

    /// GET `url` and return the body text of a 2xx response.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("Response status code: {}", status);
        if !status.is_success() {
            return Err(FetchError::Upstream(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Reading body from {} failed: {}", url, e);
            FetchError::from(e)
        })?;
        tracing::debug!("Response length: {}", body.len());

        Ok(body)
    }
}
