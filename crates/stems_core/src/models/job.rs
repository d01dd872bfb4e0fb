//! Job description submitted by a front end.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use super::enums::{Bitrate, SeparationModel, StemFormat};

/// File extensions offered by the front ends for local sources.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp3", "wav", "flac", "m4a"];

/// Specification for one download-and-split job.
///
/// Immutable once handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Remote URL or local file path.
    pub source: String,
    /// Bitrate of the transcoded MP3.
    pub bitrate: Bitrate,
    /// Separation model to run.
    pub model: SeparationModel,
    /// Split into vocals + accompaniment only.
    pub two_stems: bool,
    /// Root of the destination layout.
    pub output_dir: PathBuf,
    /// Encoding of the stem files.
    #[serde(default)]
    pub stem_format: StemFormat,
}

impl Job {
    /// Create a job with default bitrate, model and format.
    pub fn new(source: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            bitrate: Bitrate::default(),
            model: SeparationModel::default(),
            two_stems: false,
            output_dir: output_dir.into(),
            stem_format: StemFormat::default(),
        }
    }

    pub fn with_bitrate(mut self, bitrate: Bitrate) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_model(mut self, model: SeparationModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_two_stems(mut self, two_stems: bool) -> Self {
        self.two_stems = two_stems;
        self
    }

    pub fn with_stem_format(mut self, stem_format: StemFormat) -> Self {
        self.stem_format = stem_format;
        self
    }

    /// Classify the source string.
    pub fn source_kind(&self) -> JobSource {
        JobSource::classify(&self.source)
    }

    /// Short summary used in the job banner.
    pub fn summary(&self) -> String {
        format!(
            "{}  |  {}  |  {}",
            self.bitrate,
            self.model,
            if self.two_stems { "2-stem" } else { "full" }
        )
    }
}

/// Where the audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// A file on the local filesystem (may not exist).
    Local(PathBuf),
    /// An http(s) URL handed to the downloader.
    Remote(Url),
}

impl JobSource {
    /// Classify a raw source string.
    ///
    /// An existing regular file is always local. Otherwise an http(s) URL is
    /// remote, and anything else is treated as a (missing) local path.
    pub fn classify(source: &str) -> Self {
        let trimmed = source.trim();
        let path = Path::new(trimmed);
        if path.is_file() {
            return Self::Local(path.to_path_buf());
        }

        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::Local(path.to_path_buf()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Whether a path has one of the [`SUPPORTED_EXTENSIONS`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn existing_file_is_local() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("song.wav");
        fs::write(&file, b"RIFF").unwrap();

        let kind = JobSource::classify(file.to_str().unwrap());
        assert_eq!(kind, JobSource::Local(file));
    }

    #[test]
    fn https_url_is_remote() {
        let kind = JobSource::classify("https://www.youtube.com/watch?v=abc123");
        assert!(kind.is_remote());

        let kind = JobSource::classify("  https://soundcloud.com/artist/track  ");
        assert!(kind.is_remote());
    }

    #[test]
    fn unknown_scheme_or_missing_path_is_local() {
        assert!(!JobSource::classify("ftp://example.com/song.mp3").is_remote());
        assert!(!JobSource::classify("/does/not/exist.wav").is_remote());
        assert!(!JobSource::classify("just some words").is_remote());
    }

    #[test]
    fn builder_sets_fields() {
        let job = Job::new("x.wav", "/out")
            .with_bitrate(Bitrate::Kbps128)
            .with_model(SeparationModel::Mdx)
            .with_two_stems(true)
            .with_stem_format(StemFormat::Flac);

        assert_eq!(job.bitrate, Bitrate::Kbps128);
        assert_eq!(job.model, SeparationModel::Mdx);
        assert!(job.two_stems);
        assert_eq!(job.stem_format, StemFormat::Flac);
        assert_eq!(job.summary(), "128 kbps  |  mdx  |  2-stem");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a/B.FLAC")));
        assert!(has_supported_extension(Path::new("song.m4a")));
        assert!(!has_supported_extension(Path::new("clip.ogg")));
        assert!(!has_supported_extension(Path::new("noext")));
    }
}
