//! Moves separation output into the destination layout.
//!
//! ```text
//! output_dir/
//!     <model>/<title>/<stem files>
//!     <title>_<kbps>k.mp3
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::models::SeparationModel;

/// Errors that abort relocation.
#[derive(Error, Debug)]
pub enum RelocateError {
    #[error("Failed to create destination {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for relocation.
pub type RelocateResult<T> = Result<T, RelocateError>;

/// Inputs for one relocation.
#[derive(Debug, Clone)]
pub struct RelocationRequest<'a> {
    /// Root the separator wrote into.
    pub scratch_root: &'a Path,
    pub model: SeparationModel,
    /// File the separator was given; its stem names the scratch subtree.
    pub separator_input: &'a Path,
    /// Sanitized job title.
    pub title: &'a str,
    pub output_dir: &'a Path,
    /// Transcoded MP3 to copy next to the stems.
    pub mp3: &'a Path,
}

impl RelocationRequest<'_> {
    /// `scratch_root/<model>/<input stem>`
    pub fn source_subtree(&self) -> PathBuf {
        crate::separation::output_subtree(self.scratch_root, self.model, self.separator_input)
    }

    /// `output_dir/<model>/<title>`
    pub fn destination(&self) -> PathBuf {
        self.output_dir.join(self.model.id()).join(self.title)
    }
}

/// What relocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    /// Destination stems directory, if any stems were found.
    pub stems_dir: Option<PathBuf>,
    /// Moved stem files at their new location.
    pub stems: Vec<PathBuf>,
    /// Subtree that was expected but did not exist.
    pub missing_subtree: Option<PathBuf>,
    /// Copied MP3.
    pub mp3_path: Option<PathBuf>,
}

impl RelocationReport {
    pub fn has_warning(&self) -> bool {
        self.missing_subtree.is_some()
    }
}

/// Move stems into place and copy the MP3 next to them.
///
/// A missing scratch subtree is not an error: it is recorded in the report
/// and the MP3 is still delivered. Scratch removal is best-effort.
pub fn relocate(request: &RelocationRequest<'_>) -> RelocateResult<RelocationReport> {
    let mut report = RelocationReport::default();
    let subtree = request.source_subtree();

    if subtree.is_dir() {
        let dest = request.destination();
        fs::create_dir_all(&dest).map_err(|source| RelocateError::CreateDir {
            path: dest.clone(),
            source,
        })?;

        let mut files: Vec<PathBuf> = fs::read_dir(&subtree)
            .map_err(|source| RelocateError::ReadDir {
                path: subtree.clone(),
                source,
            })?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        files.sort();

        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = dest.join(name);
            move_path(&file, &target)?;
            report.stems.push(target);
        }

        if let Err(e) = fs::remove_dir_all(request.scratch_root) {
            tracing::debug!(
                "Could not remove separation scratch {}: {}",
                request.scratch_root.display(),
                e
            );
        }
        report.stems_dir = Some(dest);
    } else {
        tracing::warn!("Expected stems folder not found at {}", subtree.display());
        report.missing_subtree = Some(subtree);
    }

    let mp3_name = request
        .mp3
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("{}.mp3", request.title).into());
    let mp3_dest = request.output_dir.join(mp3_name);
    fs::create_dir_all(request.output_dir).map_err(|source| RelocateError::CreateDir {
        path: request.output_dir.to_path_buf(),
        source,
    })?;
    fs::copy(request.mp3, &mp3_dest).map_err(|source| RelocateError::Copy {
        from: request.mp3.to_path_buf(),
        to: mp3_dest.clone(),
        source,
    })?;
    report.mp3_path = Some(mp3_dest);

    Ok(report)
}

/// Rename, falling back to copy + delete across filesystems.
fn move_path(from: &Path, to: &Path) -> RelocateResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let move_err = |source: io::Error| RelocateError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if from.is_dir() {
        copy_dir(from, to).map_err(move_err)?;
        fs::remove_dir_all(from).map_err(move_err)?;
    } else {
        fs::copy(from, to).map_err(move_err)?;
        fs::remove_file(from).map_err(move_err)?;
    }
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
