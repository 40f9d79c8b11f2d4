//! HTTP fetcher implementation
//!
//! The crawler talks to the network only through the [`Fetcher`] trait, so
//! tests and alternative transports can stand in for [`HttpFetcher`].

use crate::config::CrawlConfig;
use crate::state::FailureReason;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound for establishing a connection, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,

    /// URL the content was served from, after redirects
    pub final_url: Url,
}

/// Why a fetch produced no HTML
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("not an HTML document: {0}")]
    NotHtml(String),

    #[error("{0}")]
    Other(String),
}

impl From<FetchError> for FailureReason {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout => FailureReason::Timeout,
            FetchError::Connection(e) => FailureReason::Connection(e),
            FetchError::HttpStatus(code) => FailureReason::HttpStatus(code),
            FetchError::NotHtml(ct) => FailureReason::NotHtml(ct),
            FetchError::Other(e) => FailureReason::Other(e),
        }
    }
}

/// Retrieves the HTML behind a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds the HTTP client used for every page request
///
/// # Example
///
/// ```
/// use web_context_builder::config::CrawlConfigBuilder;
/// use web_context_builder::crawler::build_http_client;
///
/// let config = CrawlConfigBuilder::new().root_url("https://example.com").build().unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().clone();

        // A missing Content-Type is given the benefit of the doubt
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type {
            if !is_html_content_type(&content_type) {
                return Err(FetchError::NotHtml(content_type));
            }
        }

        let html = response.text().await.map_err(classify_error)?;

        Ok(FetchedPage { html, final_url })
    }
}

/// Maps a reqwest error onto the fetch failure taxonomy
fn classify_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Connection(err.to_string())
    } else if err.is_redirect() {
        FetchError::Other(format!("redirect error: {}", err))
    } else if let Some(status) = err.status() {
        FetchError::HttpStatus(status.as_u16())
    } else {
        FetchError::Other(err.to_string())
    }
}

/// Returns true for `text/html` and `application/xhtml+xml`, ignoring parameters
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}
