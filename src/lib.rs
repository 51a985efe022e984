//! Rajpatra: a resumable fetch-and-ledger engine for gazette archives
//!
//! This crate implements the machinery shared by gazette crawlers: HTTP
//! fetching with retry and explicit cookie threading, dedup-by-key document
//! persistence, date-range synchronization with cooperative cancellation,
//! and durable append-only progress ledgers that make reruns resumable.

pub mod config;
pub mod fetch;
pub mod gazette;
pub mod ledger;
pub mod storage;
pub mod sync;
pub mod url;

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for Rajpatra operations
#[derive(Debug, Error)]
pub enum RajpatraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("No start date configured for source '{name}'")]
    MissingStartDate { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Rajpatra operations
pub type Result<T> = std::result::Result<T, RajpatraError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetch::{CookieStore, FetchError, FetchOptions, FetchResponse, Fetcher, PostData};
pub use gazette::{ContentKind, Metainfo, RelativeKey};
pub use ledger::{
    IdentifierFileSource, ItemProcessor, ItemSource, LedgerRunner, LedgerSet, RunSummary,
};
pub use storage::{FileStore, RawStore, SaveOptions, StorageGate};
pub use sync::{DayAdapter, SyncDriver};
pub use url::fix_url;
