//! Audio decoding for analysis.
//!
//! Decodes any input the transcoder understands to mono f32 samples at
//! the analysis sample rate, entirely in memory.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use super::types::{AnalysisError, AnalysisResult, AudioData, ANALYSIS_SAMPLE_RATE};

/// Produces decoded audio for analysis.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> AnalysisResult<AudioData>;
}

/// Decoder backed by an ffmpeg compatible executable.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: String,
    sample_rate: u32,
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            sample_rate: ANALYSIS_SAMPLE_RATE,
        }
    }

    /// Arguments decoding `input` to raw mono f32 on stdout.
    pub fn args(&self, input: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-f".to_string(),
            "f32le".to_string(),
            "pipe:1".to_string(),
        ]
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> AnalysisResult<AudioData> {
        if !path.exists() {
            return Err(AnalysisError::SourceNotFound(path.display().to_string()));
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(path))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .stdout(Stdio::piped());

        tracing::debug!("Decoding for analysis: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| AnalysisError::DecodeError(format!("Failed to spawn {}: {}", self.program, e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AnalysisError::DecodeError("Failed to capture decoder stdout".to_string()))?;

        let mut buffer = Vec::new();
        stdout
            .read_to_end(&mut buffer)
            .map_err(|e| AnalysisError::DecodeError(format!("Failed to read decoder output: {}", e)))?;

        let status = child
            .wait()
            .map_err(|e| AnalysisError::DecodeError(format!("Decoder process error: {}", e)))?;

        if !status.success() {
            return Err(AnalysisError::DecodeError(format!(
                "{} exited with code: {:?}",
                self.program,
                status.code()
            )));
        }

        let samples = bytes_to_f32_samples(&buffer);
        if samples.is_empty() {
            return Err(AnalysisError::InvalidAudio("No audio samples decoded".to_string()));
        }

        tracing::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / self.sample_rate as f64,
            path.display()
        );

        Ok(AudioData::new(samples, self.sample_rate))
    }
}

/// Convert raw bytes to f32 samples (little-endian). A trailing partial
/// sample is dropped.
pub(crate) fn bytes_to_f32_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
