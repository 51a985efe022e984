//! Durable progress ledgers
//!
//! This module makes long item-stream runs resumable and crash-safe:
//! - `LedgerSet`: the done/error/updated append-only files of one run
//! - `LedgerRunner`: skip-done, isolate-failures iteration
//! - `IdentifierFileSource`: an item stream read from a static id list

mod files;
mod runner;

pub use files::{LedgerError, LedgerResult, LedgerSet};
pub use runner::{IdentifierFileSource, ItemProcessor, ItemSource, LedgerRunner, RunSummary};
