//! Local file sources.

use std::fs;
use std::path::Path;

use super::sanitize::title_or_default;
use super::{AcquireError, AcquireResult, Acquired};

/// Copy a local audio file into the job's scratch directory.
///
/// The copy is named after the sanitized title so later stages never see
/// the original path's spaces or foreign characters.
pub fn acquire_local(source: &Path, scratch_dir: &Path) -> AcquireResult<Acquired> {
    if !source.is_file() {
        return Err(AcquireError::not_found(source));
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = title_or_default(&stem);

    let file_name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", title, ext),
        None => title.clone(),
    };

    fs::create_dir_all(scratch_dir)
        .map_err(|e| AcquireError::io("creating scratch directory", e))?;

    let dest = scratch_dir.join(file_name);
    fs::copy(source, &dest).map_err(|e| AcquireError::io("copying local source", e))?;

    tracing::debug!("Copied {} -> {}", source.display(), dest.display());

    Ok(Acquired {
        path: dest,
        title,
        remote: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_into_scratch_with_sanitized_name() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("My Song: Live.wav");
        fs::write(&src, b"RIFF....WAVE").unwrap();
        let scratch = dir.path().join("job");

        let acquired = acquire_local(&src, &scratch).unwrap();

        assert_eq!(acquired.title, "My_Song_Live");
        assert_eq!(acquired.path, scratch.join("My_Song_Live.wav"));
        assert_eq!(fs::read(&acquired.path).unwrap(), b"RIFF....WAVE");
        assert!(src.exists());
        assert!(!acquired.remote);
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempdir().unwrap();
        let err = acquire_local(&dir.path().join("ghost.mp3"), dir.path()).unwrap_err();
        assert!(matches!(err, AcquireError::NotFound { .. }));
    }

    #[test]
    fn unprintable_stem_falls_back_to_default_title() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("???.flac");
        if fs::write(&src, b"fLaC").is_err() {
            // Filesystem rejects '?' (e.g. on Windows).
            return;
        }

        let acquired = acquire_local(&src, &dir.path().join("job")).unwrap();
        assert_eq!(acquired.title, "audio");
        assert!(acquired.path.ends_with("audio.flac"));
    }
}
