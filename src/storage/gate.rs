//! Fetch-if-absent-then-persist gate
//!
//! The `StorageGate` is the entry point site adapters use for every
//! candidate document: it checks the dedup key, fetches only when needed,
//! validates the body, and persists raw content plus metadata. Every
//! failure path reports `false` instead of an error so one bad document
//! can never abort a scrape loop.

use crate::config::StorageConfig;
use crate::fetch::{FetchOptions, Fetcher};
use crate::gazette::{Metainfo, RelativeKey};
use crate::storage::traits::{RawStore, StorageResult};
use crate::url::fix_url;
use reqwest::header::HeaderMap;
use std::fmt;

/// Per-call options for [`StorageGate::save_gazette`]
pub struct SaveOptions<'a> {
    /// Fetch options passed through to the fetcher
    pub fetch: FetchOptions<'a>,

    /// Check URL shape up front and attach the canonical URL to the
    /// metadata on success; disable for documents only reachable through
    /// opaque POST endpoints
    pub validate_url: bool,

    /// Minimum body size override; the configured `min-raw-bytes`
    /// applies when absent
    pub min_size: Option<u64>,

    /// Extra check on the fetched body, applied after the size check.
    /// Sources whose servers answer errors with an HTTP 200 page use this
    /// to reject documents masquerading as the requested type.
    pub validity: Option<&'a (dyn Fn(&[u8]) -> bool + Sync)>,
}

impl Default for SaveOptions<'_> {
    fn default() -> Self {
        SaveOptions {
            fetch: FetchOptions::default(),
            validate_url: true,
            min_size: None,
            validity: None,
        }
    }
}

impl fmt::Debug for SaveOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveOptions")
            .field("fetch", &self.fetch)
            .field("validate_url", &self.validate_url)
            .field("min_size", &self.min_size)
            .field("validity", &self.validity.is_some())
            .finish()
    }
}

/// Dedup-aware persistence front for one source
pub struct StorageGate<'a, S> {
    fetcher: &'a Fetcher,
    store: &'a S,
    source: String,
    min_raw_bytes: u64,
}

impl<'a, S: RawStore> StorageGate<'a, S> {
    /// Creates a gate for `source` over a fetcher and a store
    pub fn new(
        fetcher: &'a Fetcher,
        store: &'a S,
        source: impl Into<String>,
        config: &StorageConfig,
    ) -> Self {
        StorageGate {
            fetcher,
            store,
            source: source.into(),
            min_raw_bytes: config.min_raw_bytes,
        }
    }

    /// The source this gate persists for
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Dedup decision: true iff `key` still needs fetching
    pub fn should_fetch(&self, key: &RelativeKey, url: &str, validate_url: bool) -> bool {
        self.store.should_download_raw(key, url, validate_url)
    }

    /// Persists raw bytes for `key`
    pub fn save_raw(
        &self,
        key: &RelativeKey,
        headers: &HeaderMap,
        body: &[u8],
    ) -> StorageResult<bool> {
        self.store.save_raw_doc(&self.source, key, headers, body)
    }

    /// Persists the metadata record for `key`
    pub fn save_metadata(&self, key: &RelativeKey, metainfo: &Metainfo) -> StorageResult<bool> {
        self.store.save_metainfo(&self.source, key, metainfo)
    }

    /// Fetches and persists one document unless it already exists
    ///
    /// The composite flow:
    /// 1. Skip entirely (returning `false`) when content already exists
    ///    at `key`.
    /// 2. Fetch `url` with the options' postdata/referer/cookies/headers.
    /// 3. Reject empty bodies, bodies at or under the minimum size, and
    ///    bodies failing the caller's validity check when one is given.
    /// 4. Persist the raw bytes; on success attach the canonical
    ///    (normalized) URL to `metainfo` unless `validate_url` is off,
    ///    then persist the metadata record.
    ///
    /// # Returns
    ///
    /// `true` only when both the raw document and its metadata were
    /// persisted by this call. Never returns an error; failures are
    /// logged and reported as `false`.
    pub async fn save_gazette(
        &self,
        key: &RelativeKey,
        url: &str,
        metainfo: &mut Metainfo,
        options: SaveOptions<'_>,
    ) -> bool {
        if !self.should_fetch(key, url, options.validate_url) {
            tracing::info!("Rawdoc already exists {}", key);
            return false;
        }

        let response = match self.fetcher.fetch(url, &options.fetch).await {
            Ok(response) => response,
            // The fetcher already warned with the reason.
            Err(_) => {
                tracing::info!("Doc not downloaded {}", url);
                return false;
            }
        };

        let min_size = options.min_size.unwrap_or(self.min_raw_bytes);
        let valid = body_is_valid(&response.body, min_size)
            && options.validity.map_or(true, |check| check(&response.body));
        if !valid {
            tracing::info!("Doc not downloaded {}", url);
            return false;
        }

        match self.save_raw(key, &response.headers, &response.body) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Not able to save the doc {}", key);
                return false;
            }
            Err(e) => {
                tracing::warn!("Could not save rawfile {}: {}", key, e);
                return false;
            }
        }
        tracing::info!("Saved rawfile {}", key);

        if options.validate_url {
            metainfo.set_url(fix_url(url));
        }

        match self.save_metadata(key, metainfo) {
            Ok(true) => {
                tracing::info!("Saved metainfo {}", key);
                true
            }
            Ok(false) => {
                tracing::info!("Not able to save metainfo {}", key);
                false
            }
            Err(e) => {
                tracing::warn!("Could not save metainfo {}: {}", key, e);
                false
            }
        }
    }
}

/// An empty body is never acceptable; a non-empty one passes when no
/// minimum is set or it is strictly larger than the minimum
fn body_is_valid(body: &[u8], min_size: u64) -> bool {
    !body.is_empty() && (min_size == 0 || body.len() as u64 > min_size)
}
