//! News API access.
//!
//! The controller talks to the feed through the [`NewsSource`] trait so that
//! paging logic can be exercised without a server:
//! - [`NewsSource`]: core trait, one page per call
//! - [`HttpNewsSource`]: the reqwest-backed implementation used by the binary
//!
//! # Failure model
//!
//! Every failure is reported as a [`FetchError`]. There are no retries here;
//! the controller decides whether an error is shown or only logged, and the
//! user retries by refreshing or loading more again.

use crate::config::Settings;
use crate::models::{HealthStatus, NewsPage, NewsStats, PageRequest};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Errors surfaced by a page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed (connection refused, timeout, reset).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },
    /// The body was not the JSON shape we expect.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Trait for fetching pages of news.
///
/// Implementors issue exactly one request per call and never retry.
#[allow(async_fn_in_trait)]
pub trait NewsSource {
    /// The endpoint, as named in user-facing error messages.
    fn endpoint(&self) -> &str;

    /// Fetch the page described by `request`.
    async fn fetch_page(&self, request: &PageRequest) -> Result<NewsPage, FetchError>;
}

/// [`NewsSource`] backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the connection pool, which lets the session
/// hand a copy to each in-flight fetch.
#[derive(Debug, Clone)]
pub struct HttpNewsSource {
    client: Client,
    endpoint: Url,
}

impl HttpNewsSource {
    /// Build a client for the configured endpoint.
    ///
    /// The request timeout bounds how long a hung fetch can hold the
    /// controller's loading flag.
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout.min(Duration::from_secs(15)))
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }

    /// URL of a single page fetch.
    pub fn page_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(request.query_pairs());
        url
    }

    /// `{endpoint}/stats`
    pub fn stats_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("stats");
        }
        url
    }

    /// The `health` resource next to the endpoint (`/api/news` -> `/api/health`).
    pub fn health_url(&self) -> Result<Url, FetchError> {
        Ok(self.endpoint.join("health")?)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn fetch_stats(&self) -> Result<NewsStats, FetchError> {
        self.get_json(self.stats_url()).await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, FetchError> {
        self.get_json(self.health_url()?).await
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Server returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(FetchError::Transport)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Received response body"
        );

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Response did not match the expected shape"
            );
            FetchError::Decode(e)
        })
    }
}

impl NewsSource for HttpNewsSource {
    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    #[instrument(level = "info", skip_all, fields(offset = request.offset, category = %request.category, reset = request.reset))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<NewsPage, FetchError> {
        let t0 = Instant::now();
        let res = self.get_json::<NewsPage>(self.page_url(request)).await;
        let dt = t0.elapsed();

        match &res {
            Ok(page) => info!(
                received = page.news_items.len(),
                has_more = page.has_more,
                total = ?page.total,
                elapsed_ms = dt.as_millis() as u64,
                "Fetched news page"
            ),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Page fetch failed"),
        }
        res
    }
}
