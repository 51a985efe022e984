//! Resumable item-stream runner
//!
//! Drives a pluggable processor over a stream of item identifiers,
//! skipping identifiers already recorded in the done ledger and isolating
//! per-item failures into the error ledger. The advertised stream count
//! is treated purely as a safety valve on iteration, never as a promise
//! of how many items the stream actually yields.

use crate::ledger::files::LedgerSet;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;

/// A stream of item identifiers to run over
///
/// Implementations may be backed by a remote search API or a static
/// identifier list file ([`IdentifierFileSource`]).
#[async_trait]
pub trait ItemSource {
    /// Advertised total number of items
    ///
    /// A hint only. Remote searches sometimes undercount or keep
    /// yielding past this number; the runner stops voluntarily once it
    /// has seen this many.
    fn approx_count(&self) -> usize;

    /// Yields the next identifier, or `None` when exhausted
    async fn next_item(&mut self) -> Option<String>;
}

/// Per-item work applied by the runner
#[async_trait]
pub trait ItemProcessor {
    /// Processes one item
    ///
    /// `Ok(true)` reports that the item's state changed (recorded in the
    /// updated ledger); `Ok(false)` that it was examined and left alone.
    async fn process(&mut self, identifier: &str) -> anyhow::Result<bool>;
}

/// Item source backed by a static identifier list file
///
/// One identifier per line; surrounding whitespace is stripped and blank
/// lines ignored. A missing file logs a warning and yields nothing.
#[derive(Debug)]
pub struct IdentifierFileSource {
    ids: VecDeque<String>,
    total: usize,
}

impl IdentifierFileSource {
    /// Loads the identifier list from `path`
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Id list file {} does not exist", path.display());
                String::new()
            }
            Err(e) => {
                tracing::warn!("Could not read id list file {}: {}", path.display(), e);
                String::new()
            }
        };

        let ids: VecDeque<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let total = ids.len();
        IdentifierFileSource { ids, total }
    }
}

#[async_trait]
impl ItemSource for IdentifierFileSource {
    fn approx_count(&self) -> usize {
        self.total
    }

    async fn next_item(&mut self) -> Option<String> {
        self.ids.pop_front()
    }
}

/// Counters for one runner invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The source's advertised total (hint only)
    pub total_hint: usize,

    /// Identifiers yielded by the source
    pub seen: usize,

    /// Identifiers newly processed this run
    pub processed: usize,

    /// Processed identifiers whose state changed
    pub updated: usize,

    /// Identifiers whose processor failed
    pub errors: usize,

    /// Identifiers skipped because a previous run completed them
    pub skipped: usize,
}

/// Resumable runner over an item stream
///
/// One runner owns the ledger set of one process/source pair. `run` may
/// be invoked repeatedly; completed identifiers carry over between
/// invocations through the done ledger.
pub struct LedgerRunner {
    ledgers: LedgerSet,
}

impl LedgerRunner {
    /// Creates a runner over `ledgers`
    pub fn new(ledgers: LedgerSet) -> Self {
        LedgerRunner { ledgers }
    }

    /// The ledger set this runner records into
    pub fn ledgers(&self) -> &LedgerSet {
        &self.ledgers
    }

    /// Runs `processor` over every identifier `source` yields
    ///
    /// Identifiers in the done ledger are skipped. On processor success
    /// the identifier is appended to the done ledger (after the updated
    /// ledger when a state change was reported, so a crash between the
    /// two writes can lose the done mark but never the update mark). On
    /// processor failure the identifier goes to the error ledger and the
    /// run continues.
    ///
    /// # Errors
    ///
    /// Ledger writes are the run's durability; an unusable ledger
    /// directory aborts the run rather than continuing without records.
    pub async fn run<S, P>(&self, source: &mut S, processor: &mut P) -> Result<RunSummary>
    where
        S: ItemSource + ?Sized,
        P: ItemProcessor + ?Sized,
    {
        let mut summary = RunSummary::default();

        self.ledgers.reset_run()?;
        let done = self.ledgers.load_done_set()?;
        tracing::info!("Already done: {}", done.len());

        let total = source.approx_count();
        summary.total_hint = total;

        while let Some(identifier) = source.next_item().await {
            summary.seen += 1;

            if done.contains(&identifier) {
                summary.skipped += 1;
                if summary.seen >= total {
                    break;
                }
                continue;
            }

            tracing::info!(
                "Processing {} - seen={} processed={} updated={} errors={} skipped={} total={}",
                identifier,
                summary.seen,
                summary.processed,
                summary.updated,
                summary.errors,
                summary.skipped,
                total
            );

            match processor.process(&identifier).await {
                Ok(updated) => {
                    if updated {
                        self.ledgers.mark_updated(&identifier)?;
                        summary.updated += 1;
                    }
                    summary.processed += 1;
                    self.ledgers.mark_done(&identifier)?;
                }
                Err(e) => {
                    tracing::error!("Unable to process item {}: {:#}", identifier, e);
                    self.ledgers.mark_error(&identifier)?;
                    summary.errors += 1;
                }
            }

            // Sources backed by remote searches can keep yielding past
            // their advertised count; stop voluntarily at the valve.
            if summary.seen >= total {
                break;
            }
        }

        tracing::info!(
            "Run finished - seen={} processed={} updated={} errors={} skipped={} total={}",
            summary.seen,
            summary.processed,
            summary.updated,
            summary.errors,
            summary.skipped,
            total
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopProcessor;

    #[async_trait]
    impl ItemProcessor for NoopProcessor {
        async fn process(&mut self, _identifier: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    /// Never stops yielding; models a search that overruns its count.
    struct EndlessSource {
        yielded: usize,
    }

    #[async_trait]
    impl ItemSource for EndlessSource {
        fn approx_count(&self) -> usize {
            3
        }

        async fn next_item(&mut self) -> Option<String> {
            self.yielded += 1;
            Some(format!("id{}", self.yielded))
        }
    }

    fn test_runner() -> (tempfile::TempDir, LedgerRunner) {
        let dir = tempfile::tempdir().unwrap();
        let runner = LedgerRunner::new(LedgerSet::new(dir.path(), "convertdocs", "goa"));
        (dir, runner)
    }

    #[test]
    fn test_missing_id_file_is_empty() {
        let source = IdentifierFileSource::load("/nonexistent/ids.txt");
        assert_eq!(source.approx_count(), 0);
    }

    #[tokio::test]
    async fn test_id_file_order_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "id1\n\n  id2  \nid3\n").unwrap();

        let mut source = IdentifierFileSource::load(&path);
        assert_eq!(source.approx_count(), 3);
        assert_eq!(source.next_item().await.as_deref(), Some("id1"));
        assert_eq!(source.next_item().await.as_deref(), Some("id2"));
        assert_eq!(source.next_item().await.as_deref(), Some("id3"));
        assert_eq!(source.next_item().await, None);
    }

    #[tokio::test]
    async fn test_safety_valve_stops_overrunning_source() {
        let (_dir, runner) = test_runner();
        let mut source = EndlessSource { yielded: 0 };
        let mut processor = NoopProcessor;

        let summary = runner.run(&mut source, &mut processor).await.unwrap();
        assert_eq!(summary.seen, 3);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.total_hint, 3);
    }

    #[tokio::test]
    async fn test_empty_source_is_a_clean_run() {
        let (dir, runner) = test_runner();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "").unwrap();

        let mut source = IdentifierFileSource::load(&path);
        let mut processor = NoopProcessor;

        let summary = runner.run(&mut source, &mut processor).await.unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
