use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::header::HeaderValue;
use std::fmt;
use url::Url;

/// Explicit per-session cookie state
///
/// Never installed on the HTTP client: the fetcher reads the Cookie header
/// out of a store right before a request and merges Set-Cookie directives
/// back into it right after. Two sessions (different sites, different days)
/// use two stores and can never contaminate each other, while one search
/// flow threads a single store through its request chain.
///
/// # Example
///
/// ```no_run
/// use rajpatra::fetch::{CookieStore, FetchOptions, Fetcher};
/// use rajpatra::config::FetchConfig;
///
/// # async fn example() -> Result<(), rajpatra::fetch::FetchError> {
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// let session = CookieStore::new();
///
/// // First request picks up the session cookie, second sends it back.
/// let options = FetchOptions { cookies: Some(&session), ..Default::default() };
/// fetcher.fetch("https://gazette.example.in/search", &options).await?;
/// fetcher.fetch("https://gazette.example.in/results", &options).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct CookieStore {
    jar: Jar,
}

impl CookieStore {
    pub fn new() -> Self {
        CookieStore { jar: Jar::default() }
    }

    /// Adds one cookie, formatted as it would appear in a Set-Cookie header
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.jar.add_cookie_str(cookie, url);
    }

    /// Cookie request-header value for a URL, if any stored cookies match
    pub(crate) fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }

    /// Merges Set-Cookie response headers for a URL into the store
    pub(crate) fn store_response_cookies(
        &self,
        headers: &mut dyn Iterator<Item = &HeaderValue>,
        url: &Url,
    ) {
        self.jar.set_cookies(headers, url);
    }
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CookieStore")
    }
}
