//! Configuration module for Rajpatra
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field defaults to the engine's historical tuning, so configuration is
//! optional and partial files are fine.
//!
//! # Example
//!
//! ```no_run
//! use rajpatra::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rajpatra.toml")).unwrap();
//! println!("Fetcher will try {} times", config.fetch.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, StorageConfig, SyncConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
