//! Registry of temporary artifacts created by a job.
//!
//! Stages register every scratch file at creation time; the worker sweeps
//! the registry exactly once when the job ends, whatever the outcome.
//! Sweeping is best-effort: failures are reported, never raised.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A registered temporary path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum TempEntry {
    File(PathBuf),
    Dir(PathBuf),
}

impl TempEntry {
    pub fn path(&self) -> &Path {
        match self {
            TempEntry::File(p) | TempEntry::Dir(p) => p,
        }
    }
}

/// Temp files and directories owned by one job.
#[derive(Debug, Default, Serialize)]
pub struct TempRegistry {
    entries: Vec<TempEntry>,
}

impl TempRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scratch file for deletion.
    pub fn register_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.contains(&path) {
            self.entries.push(TempEntry::File(path));
        }
    }

    /// Register a scratch directory for recursive deletion.
    pub fn register_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.contains(&path) {
            self.entries.push(TempEntry::Dir(path));
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path() == path)
    }

    pub fn entries(&self) -> &[TempEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete everything registered.
    ///
    /// Files go first in registration order, then directories from the
    /// most recently registered. Missing paths count as removed.
    pub fn sweep(self) -> CleanupReport {
        let mut report = CleanupReport::default();

        let (files, dirs): (Vec<_>, Vec<_>) = self
            .entries
            .into_iter()
            .partition(|e| matches!(e, TempEntry::File(_)));

        for entry in files.into_iter().chain(dirs.into_iter().rev()) {
            let result = match &entry {
                TempEntry::File(path) if path.exists() || path.is_symlink() => fs::remove_file(path),
                TempEntry::Dir(path) if path.exists() => fs::remove_dir_all(path),
                _ => Ok(()),
            };

            match result {
                Ok(()) => {
                    tracing::debug!("Removed temp {}", entry.path().display());
                    report.removed.push(entry.path().to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("Could not remove temp {}: {}", entry.path().display(), e);
                    report
                        .failed
                        .push((entry.path().to_path_buf(), e.to_string()));
                }
            }
        }

        report
    }
}

/// Outcome of a registry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
