//! Storage module for persisting fetched documents
//!
//! This module handles persistence of raw documents and their metadata,
//! including:
//! - The `RawStore` backend contract (dedup check, raw save, metadata save)
//! - The filesystem-backed `FileStore` implementation
//! - The `StorageGate` composite that fetches only what is missing

mod file_store;
mod gate;
mod traits;

pub use file_store::FileStore;
pub use gate::{SaveOptions, StorageGate};
pub use traits::{RawStore, StorageError, StorageResult};
