//! HTTP fetching
//!
//! This module provides the HTTP layer of the engine:
//! - `Fetcher`: retrying fetch with politeness delay and error classification
//! - `CookieStore`: explicit per-session cookie threading
//! - `build_http_client`: configured reqwest client construction

mod client;
mod cookies;
mod fetcher;

pub use client::build_http_client;
pub use cookies::CookieStore;
pub use fetcher::{FetchError, FetchOptions, FetchResponse, Fetcher, PostData};
