//! HTTP client for the MetaLocator REST API.
//!
//! Wraps `reqwest` with header-based API key authentication, per-endpoint
//! timeouts, and typed response parsing. The bulk call hands back the raw
//! status and body so callers can apply their own accounting rules; the
//! search call parses the body and surfaces non-2xx statuses as errors.

use std::time::Duration;

use metaloc_core::{AppConfig, LocationRecord};
use reqwest::{Client, Url};

use crate::error::ApiError;
use crate::search::SearchQuery;
use crate::transport::{BulkTransport, SearchTransport};
use crate::types::{RawResponse, SearchResponse};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for the MetaLocator REST API.
///
/// Use [`MetalocatorClient::from_config`] in the binaries or
/// [`MetalocatorClient::new`] to point at a mock server in tests.
pub struct MetalocatorClient {
    client: Client,
    api_key: String,
    base_url: Url,
    bulk_timeout: Duration,
    search_timeout: Duration,
}

impl MetalocatorClient {
    /// Creates a client for `base_url` with separate bulk and search timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(
        api_key: &str,
        base_url: &str,
        bulk_timeout_secs: u64,
        search_timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("metaloc/0.1 (location-directory-client)")
            .build()?;

        let base_url = parse_base_url(base_url)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            bulk_timeout: Duration::from_secs(bulk_timeout_secs),
            search_timeout: Duration::from_secs(search_timeout_secs),
        })
    }

    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// See [`MetalocatorClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_key,
            &config.api_base_url,
            config.bulk_timeout_secs,
            config.search_timeout_secs,
        )
    }

    /// `{base}/data/bulk`
    #[must_use]
    pub fn bulk_url(&self) -> Url {
        self.endpoint(&["data", "bulk"])
    }

    /// `{base}/interfaces/{item_id}/search?...` with percent-encoded values.
    #[must_use]
    pub fn search_url(&self, item_id: &str, query: &SearchQuery) -> Url {
        let mut url = self.endpoint(&["interfaces", item_id, "search"]);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }

    /// POSTs one batch as a JSON array and returns the status and raw body.
    ///
    /// Non-2xx responses are returned as `Ok`; classifying them is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Timeout`] if the exchange exceeds the bulk timeout.
    /// - [`ApiError::Http`] on connection, TLS, or body-read failure.
    pub async fn send_bulk(&self, records: &[LocationRecord]) -> Result<RawResponse, ApiError> {
        let url = self.bulk_url();
        let timeout = self.bulk_timeout;

        let response = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(records)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        tracing::debug!(status, records = records.len(), "bulk request completed");
        Ok(RawResponse { status, body })
    }

    /// Runs one search and parses the `results` list.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Timeout`] if the exchange exceeds the search timeout.
    /// - [`ApiError::Http`] on connection, TLS, or body-read failure.
    /// - [`ApiError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ApiError::Deserialize`] if the body is not valid JSON.
    pub async fn run_search(
        &self,
        item_id: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, ApiError> {
        let url = self.search_url(item_id, query);
        let timeout = self.search_timeout;

        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: redacted(&url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: format!("search(item_id={item_id})"),
                source: e,
            })?;

        Ok(SearchResponse::from_value(&value))
    }

    /// Clones the base URL and appends `segments` as encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl BulkTransport for MetalocatorClient {
    async fn post_bulk(&self, records: &[LocationRecord]) -> Result<RawResponse, ApiError> {
        self.send_bulk(records).await
    }
}

impl SearchTransport for MetalocatorClient {
    async fn search(&self, item_id: &str, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        self.run_search(item_id, query).await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason,
    };

    let url = Url::parse(base_url.trim().trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    Ok(url)
}

/// Timeouts get their own variant so callers can report them distinctly.
fn transport_error(err: reqwest::Error, url: &Url, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            url: redacted(url),
            timeout_secs: timeout.as_secs(),
        }
    } else {
        ApiError::Http(err.without_url())
    }
}

/// URL without its query string, for error messages.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
