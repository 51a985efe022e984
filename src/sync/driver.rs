//! Date-range sync driver
//!
//! Walks a date range one calendar day at a time, delegating the actual
//! scraping of each day to a site adapter. Days are visited in ascending
//! order with no parallelism; a cancellation flag is polled at each day
//! boundary, so an in-flight day always completes before the driver
//! stops.

use crate::config::SyncConfig;
use crate::gazette::RelativeKey;
use crate::{RajpatraError, Result};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use std::sync::atomic::{AtomicBool, Ordering};

/// Site adapter contract consumed by the driver
///
/// Implementations know how to scrape one source for one day: listing
/// pages, forms, pagination, and the persistence calls for each document
/// found. The driver never looks inside; it only sequences days and
/// collects the returned keys.
#[async_trait]
pub trait DayAdapter {
    /// Source name, used as the leading segment of every key
    fn name(&self) -> &str;

    /// Earliest date this source publishes from, when known
    fn start_date(&self) -> Option<NaiveDate> {
        None
    }

    /// Scrapes one day and returns the keys of documents persisted
    ///
    /// `day_key` is the `source/ISO-date` prefix for the day. "Nothing
    /// published today" is `Ok(vec![])`, not an error.
    async fn download_one_day(
        &self,
        day_key: &RelativeKey,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<RelativeKey>>;
}

/// Sequential per-day sync over a site adapter
pub struct SyncDriver<'a, A> {
    adapter: &'a A,
    config: SyncConfig,
}

impl<'a, A: DayAdapter> SyncDriver<'a, A> {
    /// Creates a driver over `adapter`
    pub fn new(adapter: &'a A, config: SyncConfig) -> Self {
        SyncDriver { adapter, config }
    }

    /// Syncs every day from `from` to `to`, both inclusive
    ///
    /// Checks `cancel` before each day; when set, logs a warning and
    /// returns the keys accumulated so far. A day whose adapter call
    /// fails contributes zero keys and never stops the range.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange` when `from` is after `to`, before any work.
    pub async fn sync_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &AtomicBool,
    ) -> Result<Vec<RelativeKey>> {
        if from > to {
            return Err(RajpatraError::InvalidDateRange { from, to });
        }

        let mut keys = Vec::new();
        let mut date = from;
        while date <= to {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!("Exiting prematurely as the cancel flag is set");
                break;
            }

            tracing::info!("Date {}", date);
            let day_key = RelativeKey::for_day(self.adapter.name(), date);
            match self.adapter.download_one_day(&day_key, date).await {
                Ok(day_keys) => {
                    tracing::info!("Got {} gazettes for day {}", day_keys.len(), date);
                    keys.extend(day_keys);
                }
                Err(e) => {
                    tracing::warn!(
                        "Could not process day {} for {}: {:#}",
                        date,
                        self.adapter.name(),
                        e
                    );
                }
            }

            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        Ok(keys)
    }

    /// Syncs from the adapter's start date through today
    ///
    /// # Errors
    ///
    /// `MissingStartDate` when the adapter has no start date.
    pub async fn sync_all(&self, cancel: &AtomicBool) -> Result<Vec<RelativeKey>> {
        let start = match self.adapter.start_date() {
            Some(start) => start,
            None => {
                return Err(RajpatraError::MissingStartDate {
                    name: self.adapter.name().to_string(),
                })
            }
        };
        self.sync_range(start, today(), cancel).await
    }

    /// Syncs the configured lookback window ending today
    ///
    /// Catches late-published or backdated entries without rescanning
    /// full history.
    pub async fn sync_daily(&self, cancel: &AtomicBool) -> Result<Vec<RelativeKey>> {
        let today = today();
        let lookback = Duration::days(i64::from(self.config.lookback_days));
        let from = today.checked_sub_signed(lookback).unwrap_or(NaiveDate::MIN);
        self.sync_range(from, today, cancel).await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
