//! Date-range synchronization
//!
//! This module sequences per-day scraping over a calendar range:
//! - `DayAdapter`: the per-source scraping contract
//! - `SyncDriver`: inclusive range walk with cooperative cancellation

mod driver;

pub use driver::{DayAdapter, SyncDriver};
