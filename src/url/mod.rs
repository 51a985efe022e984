//! URL handling module for Rajpatra
//!
//! This module repairs the loosely-formed URLs gazette sites hand out, so
//! the fetcher and adapters can pass them around without pre-encoding.

mod fix;

// Re-export main functions
pub use fix::fix_url;
