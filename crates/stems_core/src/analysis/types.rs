//! Core types for tempo/key analysis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample rate the analysis contract expects.
pub const ANALYSIS_SAMPLE_RATE: u32 = 44_100;

/// Decoded mono audio.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Mono samples, nominally in -1.0..=1.0.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };
        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw little-endian f32 bytes, the wire format analyzers read.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Estimated tempo and musical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoKey {
    /// Tempo rounded to the nearest integer BPM.
    pub tempo_bpm: i32,
    /// Key label, e.g. `"F# minor"`.
    pub key_label: String,
}

impl TempoKey {
    pub fn new(bpm: f64, key: &str, scale: &str) -> Self {
        Self {
            tempo_bpm: bpm.round() as i32,
            key_label: format!("{} {}", key.trim(), scale.trim().to_ascii_lowercase()),
        }
    }
}

impl std::fmt::Display for TempoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} BPM  |  {}", self.tempo_bpm, self.key_label)
    }
}

/// Errors from decoding or analysis. Never fatal to a job.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The decoder failed.
    #[error("Decoder error: {0}")]
    DecodeError(String),

    /// The analyzer command failed.
    #[error("Analyzer error: {0}")]
    AnalyzerError(String),

    /// The analyzer's output could not be understood.
    #[error("Invalid analyzer output: {0}")]
    InvalidOutput(String),

    /// Decoding produced no samples.
    #[error("Invalid audio data: {0}")]
    InvalidAudio(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Source file not found.
    #[error("Source file not found: {0}")]
    SourceNotFound(String),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
