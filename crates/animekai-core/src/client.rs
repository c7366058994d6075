//! HTTP client for animekai.to
//!
//! Thin wrapper over `reqwest` that always sends a desktop-browser header set,
//! enforces a fixed timeout and turns transport failures and non-2xx answers
//! into [`AnimeKaiError`]. Requests are never retried.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{AnimeKaiError, Result};

/// Default User-Agent mimicking a desktop Chrome
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Browser-like header set sent with every request.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Merge caller headers over a default set. Caller values win.
pub fn merge_headers(defaults: &HeaderMap, extra: Option<&HeaderMap>) -> HeaderMap {
    let mut merged = defaults.clone();
    if let Some(extra) = extra {
        for name in extra.keys() {
            merged.remove(name);
        }
        for (name, value) in extra {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Configuration for the AnimeKai HTTP client
///
/// Built once at startup and moved into the client; nothing mutates it later.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout (default: 10s)
    pub timeout: Duration,
    /// Headers attached to every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: default_headers(),
        }
    }
}

/// Raw upstream answer
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// HTTP client for animekai.to
#[derive(Debug, Clone)]
pub struct AnimeKaiClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    config: ClientConfig,
}

impl AnimeKaiClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|source| AnimeKaiError::Fetch {
                url: String::new(),
                source,
            })?;

        Ok(Self { client, config })
    }

    /// GET `url` with the default headers, overridden by `extra_headers`.
    ///
    /// # Errors
    /// - `AnimeKaiError::Fetch` - network failure or timeout
    /// - `AnimeKaiError::Status` - upstream answered with a non-2xx status
    pub async fn get(&self, url: &str, extra_headers: Option<&HeaderMap>) -> Result<FetchResponse> {
        let headers = merge_headers(&self.config.default_headers, extra_headers);

        let fetch_error = |source| AnimeKaiError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(fetch_error)?;
        let status = response.status();
        debug!(%url, %status, "fetched upstream page");

        if !status.is_success() {
            return Err(AnimeKaiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers().clone();
        let body = response.text().await.map_err(fetch_error)?;

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }

    /// GET `url` and return only the body text.
    pub async fn get_text(&self, url: &str, extra_headers: Option<&HeaderMap>) -> Result<String> {
        Ok(self.get(url, extra_headers).await?.body)
    }
}
