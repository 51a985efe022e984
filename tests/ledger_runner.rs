//! Integration tests for ledger-backed resumable runs
//!
//! These tests drive the runner over real ledger files in a temp
//! directory and check the resume, fault-isolation, and crash-safety
//! properties end to end.

use async_trait::async_trait;
use rajpatra::{IdentifierFileSource, ItemProcessor, LedgerRunner, LedgerSet};
use std::collections::HashSet;

/// Records every identifier it processes; fails or reports updates on cue
struct ScriptedProcessor {
    fail: HashSet<String>,
    report_updated: HashSet<String>,
    handled: Vec<String>,
}

impl ScriptedProcessor {
    fn new() -> Self {
        ScriptedProcessor {
            fail: HashSet::new(),
            report_updated: HashSet::new(),
            handled: Vec::new(),
        }
    }

    fn failing_on(ids: &[&str]) -> Self {
        let mut processor = Self::new();
        processor.fail = ids.iter().map(|s| s.to_string()).collect();
        processor
    }

    fn updating_on(ids: &[&str]) -> Self {
        let mut processor = Self::new();
        processor.report_updated = ids.iter().map(|s| s.to_string()).collect();
        processor
    }
}

#[async_trait]
impl ItemProcessor for ScriptedProcessor {
    async fn process(&mut self, identifier: &str) -> anyhow::Result<bool> {
        if self.fail.contains(identifier) {
            anyhow::bail!("scripted failure");
        }
        self.handled.push(identifier.to_string());
        Ok(self.report_updated.contains(identifier))
    }
}

fn write_id_file(dir: &std::path::Path, ids: &[&str]) -> std::path::PathBuf {
    let path = dir.join("ids.txt");
    std::fs::write(&path, ids.join("\n") + "\n").unwrap();
    path
}

/// Test one failing item: done keeps the rest in order, error records it
#[tokio::test]
async fn test_failure_is_isolated_to_one_item() {
    let dir = tempfile::tempdir().unwrap();
    let id_file = write_id_file(dir.path(), &["id1", "id2", "id3"]);

    let ledgers = LedgerSet::new(dir.path(), "convertdocs", "goa");
    let runner = LedgerRunner::new(ledgers);
    let mut source = IdentifierFileSource::load(&id_file);
    let mut processor = ScriptedProcessor::failing_on(&["id2"]);

    let summary = runner.run(&mut source, &mut processor).await.unwrap();

    assert_eq!(summary.seen, 3);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.updated, 0);

    let done = std::fs::read_to_string(runner.ledgers().done_path()).unwrap();
    assert_eq!(done, "id1\nid3\n");
    let error = std::fs::read_to_string(runner.ledgers().error_path()).unwrap();
    assert_eq!(error, "id2\n");
    assert!(!runner.ledgers().updated_path().exists());
}

/// Test a rerun with a grown id list touches only the new identifier
#[tokio::test]
async fn test_rerun_processes_only_new_items() {
    let dir = tempfile::tempdir().unwrap();

    let ledgers = LedgerSet::new(dir.path(), "convertdocs", "goa");
    let runner = LedgerRunner::new(ledgers);

    let first_file = write_id_file(dir.path(), &["id1", "id2"]);
    let mut source = IdentifierFileSource::load(&first_file);
    let mut processor = ScriptedProcessor::new();
    runner.run(&mut source, &mut processor).await.unwrap();

    let second_file = write_id_file(dir.path(), &["id1", "id2", "id3"]);
    let mut source = IdentifierFileSource::load(&second_file);
    let mut processor = ScriptedProcessor::new();
    let summary = runner.run(&mut source, &mut processor).await.unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(processor.handled, vec!["id3"]);

    let done = std::fs::read_to_string(runner.ledgers().done_path()).unwrap();
    assert_eq!(done, "id1\nid2\nid3\n");
}

/// Test a run that died mid-stream resumes at the first unrecorded item
#[tokio::test]
async fn test_interrupted_run_resumes_after_last_done() {
    let dir = tempfile::tempdir().unwrap();
    let id_file = write_id_file(dir.path(), &["id1", "id2", "id3", "id4"]);

    // A previous run completed id1 and id2, then the process died.
    let ledgers = LedgerSet::new(dir.path(), "convertdocs", "goa");
    ledgers.mark_done("id1").unwrap();
    ledgers.mark_done("id2").unwrap();

    let runner = LedgerRunner::new(ledgers);
    let mut source = IdentifierFileSource::load(&id_file);
    let mut processor = ScriptedProcessor::new();
    let summary = runner.run(&mut source, &mut processor).await.unwrap();

    assert_eq!(processor.handled, vec!["id3", "id4"]);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.processed, 2);
}

/// Test state changes land in the updated ledger alongside done
#[tokio::test]
async fn test_updates_recorded_alongside_done() {
    let dir = tempfile::tempdir().unwrap();
    let id_file = write_id_file(dir.path(), &["id1", "id2", "id3"]);

    let ledgers = LedgerSet::new(dir.path(), "convertdocs", "goa");
    let runner = LedgerRunner::new(ledgers);
    let mut source = IdentifierFileSource::load(&id_file);
    let mut processor = ScriptedProcessor::updating_on(&["id2"]);

    let summary = runner.run(&mut source, &mut processor).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.updated, 1);

    let updated = std::fs::read_to_string(runner.ledgers().updated_path()).unwrap();
    assert_eq!(updated, "id2\n");
    let done = std::fs::read_to_string(runner.ledgers().done_path()).unwrap();
    assert_eq!(done, "id1\nid2\nid3\n");
}

/// Test error and updated ledgers report only the latest run
#[tokio::test]
async fn test_per_run_ledgers_reset_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let id_file = write_id_file(dir.path(), &["id1", "id2"]);

    let ledgers = LedgerSet::new(dir.path(), "convertdocs", "goa");
    let runner = LedgerRunner::new(ledgers);

    let mut source = IdentifierFileSource::load(&id_file);
    let mut processor = ScriptedProcessor::failing_on(&["id2"]);
    runner.run(&mut source, &mut processor).await.unwrap();
    assert!(runner.ledgers().error_path().exists());

    // id2 never made it into done, so the next run picks it up; with the
    // failure gone the error ledger stays clean.
    let mut source = IdentifierFileSource::load(&id_file);
    let mut processor = ScriptedProcessor::new();
    let summary = runner.run(&mut source, &mut processor).await.unwrap();

    assert_eq!(processor.handled, vec!["id2"]);
    assert_eq!(summary.errors, 0);
    assert!(!runner.ledgers().error_path().exists());

    let done = std::fs::read_to_string(runner.ledgers().done_path()).unwrap();
    assert_eq!(done, "id1\nid2\n");
}
