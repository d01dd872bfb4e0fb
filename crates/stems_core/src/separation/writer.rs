//! Stem output encodings.

use crate::models::{Bitrate, StemFormat};

/// Chooses how the separator encodes stem files.
///
/// A writer only contributes command-line flags and the resulting file
/// extension; the separator does the actual encoding.
pub trait StemWriter: Send + Sync {
    /// Flags appended to the separator command.
    fn separator_args(&self, bitrate: Bitrate) -> Vec<String>;

    /// Extension of the files the separator will produce.
    fn extension(&self) -> &'static str;
}

impl StemWriter for StemFormat {
    fn separator_args(&self, bitrate: Bitrate) -> Vec<String> {
        match self {
            StemFormat::Wav16 => Vec::new(),
            StemFormat::Wav24 => vec!["--int24".to_string()],
            StemFormat::WavFloat => vec!["--float32".to_string()],
            StemFormat::Flac => vec!["--flac".to_string()],
            StemFormat::Mp3 => vec![
                "--mp3".to_string(),
                "--mp3-bitrate".to_string(),
                bitrate.kbps().to_string(),
            ],
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            StemFormat::Wav16 | StemFormat::Wav24 | StemFormat::WavFloat => "wav",
            StemFormat::Flac => "flac",
            StemFormat::Mp3 => "mp3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_float_wav() {
        let format = StemFormat::default();
        assert_eq!(format.separator_args(Bitrate::Kbps320), vec!["--float32"]);
        assert_eq!(format.extension(), "wav");
    }

    #[test]
    fn flags_per_format() {
        assert!(StemFormat::Wav16.separator_args(Bitrate::Kbps320).is_empty());
        assert_eq!(StemFormat::Wav24.separator_args(Bitrate::Kbps320), vec!["--int24"]);
        assert_eq!(StemFormat::Flac.separator_args(Bitrate::Kbps320), vec!["--flac"]);
        assert_eq!(StemFormat::Flac.extension(), "flac");
    }

    #[test]
    fn mp3_stems_follow_job_bitrate() {
        assert_eq!(
            StemFormat::Mp3.separator_args(Bitrate::Kbps192),
            vec!["--mp3", "--mp3-bitrate", "192"]
        );
        assert_eq!(StemFormat::Mp3.extension(), "mp3");
    }
}
