//! Source acquisition.
//!
//! Turns a job source into a local audio file inside the job's scratch
//! directory plus a sanitized title used for every output name. Local
//! files are copied, remote URLs are fetched with the configured
//! downloader. A single attempt is made; failures are terminal.

mod download;
mod local;
mod sanitize;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::process::ProcessError;

pub use download::{find_downloaded, Downloader};
pub use local::acquire_local;
pub use sanitize::{sanitize_title, title_or_default, DEFAULT_TITLE};

/// A source made available locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    /// Local copy of the audio, inside the job's scratch directory.
    pub path: PathBuf,
    /// Sanitized title derived from the source name.
    pub title: String,
    /// Whether the audio came from a remote URL.
    pub remote: bool,
}

/// Errors raised while acquiring a source.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Local source does not exist (or is not a file).
    #[error("Source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Filesystem operation failed.
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The downloader failed or could not be started.
    #[error(transparent)]
    Download(#[from] ProcessError),

    /// The downloader exited cleanly but left no audio file.
    #[error("Download produced no audio file in {}", dir.display())]
    NothingDownloaded { dir: PathBuf },
}

impl AcquireError {
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for acquisition.
pub type AcquireResult<T> = Result<T, AcquireError>;
