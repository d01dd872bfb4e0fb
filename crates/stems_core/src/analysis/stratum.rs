//! In-process tempo/key estimation using stratum-dsp.

use stratum_dsp::{analyze_audio, AnalysisConfig, Key};
use tracing::debug;

use super::analyzer::TempoKeyAnalyzer;
use super::types::{AnalysisError, AnalysisResult, AudioData, TempoKey};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Default analyzer: onset/autocorrelation tempo and chroma template key
/// detection, no external process.
#[derive(Debug, Clone, Default)]
pub struct StratumAnalyzer;

impl StratumAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl TempoKeyAnalyzer for StratumAnalyzer {
    fn analyze(&self, audio: &AudioData) -> AnalysisResult<TempoKey> {
        if audio.is_empty() {
            return Err(AnalysisError::InvalidAudio("No samples to analyze".to_string()));
        }

        debug!(
            "Analyzing tempo/key with stratum-dsp ({} samples, {}Hz)",
            audio.len(),
            audio.sample_rate
        );

        let result = analyze_audio(&audio.samples, audio.sample_rate, AnalysisConfig::default())
            .map_err(|e| AnalysisError::AnalyzerError(format!("stratum-dsp: {}", e)))?;

        let bpm = f64::from(result.bpm);
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(AnalysisError::AnalyzerError("no tempo detected".to_string()));
        }

        let (note, scale) = key_parts(result.key);
        debug!(
            "Detected {:.2} BPM (confidence {:.2}), {} {} (confidence {:.2})",
            bpm, result.bpm_confidence, note, scale, result.key_confidence
        );

        Ok(TempoKey::new(bpm, note, scale))
    }
}

/// Split a detected key into note name and scale.
fn key_parts(key: Key) -> (&'static str, &'static str) {
    match key {
        Key::Major(i) => (NOTE_NAMES[i as usize % 12], "major"),
        Key::Minor(i) => (NOTE_NAMES[i as usize % 12], "minor"),
    }
}
