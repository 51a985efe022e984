//! Storage traits and error types
//!
//! This module defines the trait interface for persistence backends and
//! associated error types.

use crate::gazette::{Metainfo, RelativeKey};
use reqwest::header::HeaderMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persistence backend implementations
///
/// This trait defines the operations the engine needs from a document
/// store: the dedup decision, raw-content persistence, and metadata
/// persistence. Raw content at a key, once saved, is authoritative and
/// is never overwritten.
pub trait RawStore {
    /// Decides whether raw content for `key` still needs downloading
    ///
    /// # Arguments
    ///
    /// * `key` - The dedup key for the document
    /// * `url` - The URL the content would be fetched from
    /// * `validate_url` - Reject unusable URLs up front when true
    ///
    /// # Returns
    ///
    /// `false` when content already exists at `key` (or the URL is
    /// unusable and `validate_url` is set), `true` otherwise
    fn should_download_raw(&self, key: &RelativeKey, url: &str, validate_url: bool) -> bool;

    /// Persists raw document bytes at `key`
    ///
    /// # Arguments
    ///
    /// * `source` - The source the document belongs to
    /// * `key` - The dedup key, which is also the storage location
    /// * `headers` - Response headers, consulted for the content type
    /// * `body` - The raw document bytes
    ///
    /// # Returns
    ///
    /// `Ok(true)` when a write occurred, `Ok(false)` when content already
    /// existed at `key` and the write was skipped
    fn save_raw_doc(
        &self,
        source: &str,
        key: &RelativeKey,
        headers: &HeaderMap,
        body: &[u8],
    ) -> StorageResult<bool>;

    /// Persists the structured metadata record for `key`
    ///
    /// Only meaningful after the raw document was saved. Unlike raw
    /// content, metadata may be rewritten.
    fn save_metainfo(
        &self,
        source: &str,
        key: &RelativeKey,
        metainfo: &Metainfo,
    ) -> StorageResult<bool>;
}
