//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - GET and POST (form or raw body) requests
//! - URL repair before every attempt
//! - Retry logic for transient failures
//! - Politeness pre-delay when the engine is throttled
//! - Explicit cookie threading per call
//! - Error classification

use crate::config::FetchConfig;
use crate::fetch::client::build_http_client;
use crate::fetch::cookies::CookieStore;
use crate::url::fix_url;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, REFERER, SET_COOKIE,
};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors terminating a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// The request never produced a usable response
    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    /// An extra header name or value was malformed
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// True when another attempt can help
    ///
    /// Connection trouble always qualifies; of the HTTP statuses only
    /// {503, 504, 403} do, the codes gazette hosts return while overloaded
    /// or rate-limiting. Every other status is final on the first answer.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => is_retryable_status(status.as_u16()),
            FetchError::Network { .. } => true,
            FetchError::InvalidHeader { .. } => false,
            FetchError::Client(_) => false,
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 503 | 504 | 403)
}

/// POST body for a fetch
#[derive(Debug, Clone)]
pub enum PostData {
    /// Name/value pairs, urlencoded on send
    Form(Vec<(String, String)>),
    /// Pre-encoded bytes, sent as-is
    Raw(Vec<u8>),
}

/// Per-call fetch options
///
/// The default is a plain GET with no session state.
#[derive(Debug, Default)]
pub struct FetchOptions<'a> {
    /// POST body; the request is a GET when absent
    pub postdata: Option<PostData>,

    /// Referer header value
    pub referer: Option<String>,

    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// Session cookie store, read before the request and updated from
    /// Set-Cookie afterwards
    pub cookies: Option<&'a CookieStore>,
}

/// A successful fetch
#[derive(Debug)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: StatusCode,

    /// Response headers
    pub headers: HeaderMap,

    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Content-Type header value, if present and readable
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// HTTP fetcher with retry, politeness delay, and explicit cookie threading
///
/// One fetcher is shared by everything scraping a source; per-session state
/// lives in the `CookieStore` values passed through `FetchOptions`, never in
/// the fetcher itself.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    backoff_secs: AtomicU64,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = build_http_client(&config)?;
        let backoff_secs = AtomicU64::new(config.backoff_secs);
        Ok(Fetcher {
            client,
            config,
            backoff_secs,
        })
    }

    /// Raises or clears the politeness pre-delay
    ///
    /// The delay applies before every attempt of every subsequent fetch.
    /// Atomic, so a supervisory loop can throttle the engine while a sync
    /// is in flight.
    pub fn set_backoff(&self, delay: Duration) {
        self.backoff_secs.store(delay.as_secs(), Ordering::Relaxed);
    }

    fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs.load(Ordering::Relaxed))
    }

    /// Fetches a URL with retry for transient failures
    ///
    /// The URL is repaired (`fix_url`) once up front, so loosely-formed
    /// URLs straight out of scraped markup are fine.
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Connection failure / timeout | Retry up to `max-attempts` |
    /// | HTTP 503, 504, 403 | Retry up to `max-attempts` |
    /// | Any other HTTP error status | Immediate error, no retry |
    /// | Malformed extra header | Immediate error, no retry |
    ///
    /// The sleep before attempt N+1 is `N × retry-delay-secs`. A politeness
    /// pre-delay (see [`Fetcher::set_backoff`]) additionally runs before
    /// every attempt when set.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch; unsafe characters are tolerated
    /// * `options` - POST body, referer, extra headers, cookie store
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - body bytes, headers, status, final URL
    /// * `Err(FetchError)` - after exhausting retries or on a permanent error
    pub async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions<'_>,
    ) -> Result<FetchResponse, FetchError> {
        let fixed = fix_url(url);
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                let delay = self.config.retry_delay() * (attempt - 1);
                tracing::debug!(
                    "Sleeping {:?} before attempt {}/{} for {}",
                    delay,
                    attempt,
                    self.config.max_attempts,
                    fixed
                );
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once(&fixed, options).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() => last_error = Some(err),
                Err(err) => return Err(err),
            }
        }

        match last_error {
            Some(err) => Err(err),
            // Config validation keeps max_attempts >= 1; degenerate to a
            // single attempt rather than panic if it ever is not.
            None => self.fetch_once(&fixed, options).await,
        }
    }

    /// One attempt: politeness delay, request, cookie merge, body read
    async fn fetch_once(
        &self,
        url: &str,
        options: &FetchOptions<'_>,
    ) -> Result<FetchResponse, FetchError> {
        let backoff = self.backoff();
        if !backoff.is_zero() {
            tracing::debug!("Politeness delay {:?} before {}", backoff, url);
            tokio::time::sleep(backoff).await;
        }

        let mut request = match &options.postdata {
            Some(PostData::Form(pairs)) => self.client.post(url).form(pairs),
            Some(PostData::Raw(bytes)) => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(bytes.clone()),
            None => self.client.get(url),
        };

        if let Some(referer) = &options.referer {
            request = request.header(REFERER, referer.as_str());
        }

        for (name, value) in &options.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FetchError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| FetchError::InvalidHeader { name: name.clone() })?;
            request = request.header(header_name, header_value);
        }

        // Cookie lookup needs a parsed URL; if parsing fails the request
        // itself will error out below, so just skip the cookies here.
        let parsed = Url::parse(url).ok();
        if let (Some(store), Some(parsed_url)) = (options.cookies, parsed.as_ref()) {
            if let Some(cookie_header) = store.cookie_header(parsed_url) {
                request = request.header(COOKIE, cookie_header);
            }
        }

        tracing::debug!("Request url: {}", url);

        let response = request.send().await.map_err(|e| {
            let err = FetchError::Network {
                url: url.to_string(),
                source: e,
            };
            tracing::warn!("Could not fetch {}: {}", url, err);
            err
        })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            let err = FetchError::Status {
                url: url.to_string(),
                status,
            };
            tracing::warn!("Could not fetch {}: {}", url, err);
            return Err(err);
        }

        if let Some(store) = options.cookies {
            let mut set_cookies = response.headers().get_all(SET_COOKIE).iter();
            store.store_response_cookies(&mut set_cookies, &final_url);
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                let err = FetchError::Network {
                    url: url.to_string(),
                    source: e,
                };
                tracing::warn!("Could not read body of {}: {}", url, err);
                err
            })?
            .to_vec();

        tracing::info!(
            "Url: {} response_url: {} status: {}",
            url,
            final_url,
            status.as_u16()
        );

        Ok(FetchResponse {
            final_url,
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(504));
        assert!(is_retryable_status(403));

        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(500));
        assert!(!is_retryable_status(502));
        assert!(!is_retryable_status(429));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn test_status_error_transience() {
        let transient = FetchError::Status {
            url: "http://example.com/".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert!(transient.is_transient());

        let permanent = FetchError::Status {
            url: "http://example.com/".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(!permanent.is_transient());
    }

    #[test]
    fn test_invalid_header_is_permanent() {
        let err = FetchError::InvalidHeader {
            name: "bad header".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_new_fetcher_with_defaults() {
        let fetcher = Fetcher::new(FetchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_set_backoff_is_visible() {
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.backoff(), Duration::ZERO);

        fetcher.set_backoff(Duration::from_secs(7));
        assert_eq!(fetcher.backoff(), Duration::from_secs(7));

        fetcher.set_backoff(Duration::ZERO);
        assert_eq!(fetcher.backoff(), Duration::ZERO);
    }

    #[test]
    fn test_backoff_starts_from_config() {
        let config = FetchConfig {
            backoff_secs: 3,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(config).unwrap();
        assert_eq!(fetcher.backoff(), Duration::from_secs(3));
    }
}
