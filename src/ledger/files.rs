//! Ledger file layout and append-only writes
//!
//! A run over a source keeps three ledgers under
//! `<data_dir>/working/<process>/<source>/`:
//! - `done.txt`: cumulative across runs, one identifier per line
//! - `error.txt`: this run's failed identifiers, truncated at run start
//! - `updated.txt`: this run's state-changed identifiers, truncated at
//!   run start
//!
//! The format has no escaping; identifiers must not contain newlines.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The three ledger files of one process over one source
#[derive(Debug)]
pub struct LedgerSet {
    dir: PathBuf,
}

impl LedgerSet {
    /// Creates the ledger set for `process` over `source` under `data_dir`
    ///
    /// Nothing is created on disk until the first append.
    pub fn new(data_dir: impl Into<PathBuf>, process: &str, source: &str) -> Self {
        LedgerSet {
            dir: data_dir.into().join("working").join(process).join(source),
        }
    }

    /// The working directory holding the ledger files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cumulative done ledger
    pub fn done_path(&self) -> PathBuf {
        self.dir.join("done.txt")
    }

    /// Path of this run's error ledger
    pub fn error_path(&self) -> PathBuf {
        self.dir.join("error.txt")
    }

    /// Path of this run's updated ledger
    pub fn updated_path(&self) -> PathBuf {
        self.dir.join("updated.txt")
    }

    /// Loads the done ledger into a set
    ///
    /// A missing file is an empty set. Lines are trimmed and blank lines
    /// ignored.
    pub fn load_done_set(&self) -> LedgerResult<HashSet<String>> {
        let path = self.done_path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(LedgerError::Io { path, source: e }),
        };

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Removes the per-run ledgers (error and updated)
    ///
    /// Called at run start; these files report only the current run. The
    /// done ledger is never touched.
    pub fn reset_run(&self) -> LedgerResult<()> {
        remove_if_present(&self.updated_path())?;
        remove_if_present(&self.error_path())?;
        Ok(())
    }

    /// Appends `identifier` to the done ledger
    pub fn mark_done(&self, identifier: &str) -> LedgerResult<()> {
        self.append_line(&self.done_path(), identifier)
    }

    /// Appends `identifier` to the error ledger
    pub fn mark_error(&self, identifier: &str) -> LedgerResult<()> {
        self.append_line(&self.error_path(), identifier)
    }

    /// Appends `identifier` to the updated ledger
    pub fn mark_updated(&self, identifier: &str) -> LedgerResult<()> {
        self.append_line(&self.updated_path(), identifier)
    }

    fn append_line(&self, path: &Path, identifier: &str) -> LedgerResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LedgerError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        writeln!(file, "{}", identifier).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> LedgerResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
