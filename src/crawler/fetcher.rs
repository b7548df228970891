//! Page fetching
//!
//! This module defines the [`PageFetcher`] capability the crawl engine depends
//! on and the HTTP implementation used in production:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for static pages
//! - Delegating JavaScript rendering to an external rendering service
//! - Error classification

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response};
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Page body (rendered HTML when rendering was requested)
    pub html: String,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code of the final response
    pub status: u16,

    /// Wall-clock time spent fetching, in milliseconds
    pub latency_ms: u64,
}

/// Network, HTTP or rendering failure for one URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// HTTP status code of the response that caused the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Capability to fetch one page
///
/// Implementations own their timeout policy; the crawl engine awaits each
/// fetch to completion.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, rendering JavaScript when `render_js` is set
    async fn fetch(&self, url: &Url, render_js: bool) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use crawl_worker::config::FetcherConfig;
/// use crawl_worker::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Body sent to the rendering service
#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
}

/// [`PageFetcher`] backed by reqwest
///
/// Static fetches are plain GETs that must return a 2xx HTML response. When
/// rendering is requested and a render endpoint is configured, the page URL
/// is POSTed as `{"url": ...}` to the endpoint and the response body is taken
/// as the rendered HTML. Without an endpoint, rendering requests fall back to
/// the static fetch.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    render_endpoint: Option<Url>,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, crate::WorkerError> {
        let client = build_http_client(config)?;
        let render_endpoint = config
            .render_endpoint
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        Ok(Self::with_client(client, render_endpoint))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, render_endpoint: Option<Url>) -> Self {
        Self {
            client,
            render_endpoint,
        }
    }

    /// Whether rendering requests go to a rendering service
    pub fn can_render(&self) -> bool {
        self.render_endpoint.is_some()
    }

    async fn fetch_static(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = content_type(&response);
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            html,
            final_url,
            status: status.as_u16(),
            latency_ms: elapsed_ms(started),
        })
    }

    async fn fetch_rendered(&self, endpoint: &Url, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        let response = self
            .client
            .post(endpoint.clone())
            .json(&RenderRequest { url: url.as_str() })
            .send()
            .await
            .map_err(|e| FetchError::Render {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Render {
                url: url.to_string(),
                message: format!("rendering service returned HTTP {}", status.as_u16()),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Render {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage {
            html,
            final_url: url.clone(),
            status: status.as_u16(),
            latency_ms: elapsed_ms(started),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, render_js: bool) -> Result<FetchedPage, FetchError> {
        match (&self.render_endpoint, render_js) {
            (Some(endpoint), true) => self.fetch_rendered(endpoint, url).await,
            (None, true) => {
                tracing::debug!(url = %url, "No render endpoint configured, fetching statically");
                self.fetch_static(url).await
            }
            (_, false) => self.fetch_static(url).await,
        }
    }
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    let url = url.to_string();

    if e.is_timeout() {
        FetchError::Timeout { url }
    } else if e.is_redirect() {
        FetchError::RedirectLimit { url }
    } else if e.is_connect() {
        FetchError::Connect {
            url,
            message: e.to_string(),
        }
    } else {
        FetchError::Request {
            url,
            message: e.to_string(),
        }
    }
}
