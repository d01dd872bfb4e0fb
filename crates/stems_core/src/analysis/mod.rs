//! Tempo and key analysis.
//!
//! Audio is decoded to mono at 44.1 kHz by an [`AudioDecoder`] and handed
//! to a [`TempoKeyAnalyzer`]: the in-process [`StratumAnalyzer`] by
//! default, or a configured [`CommandAnalyzer`]. Failures are reported to
//! the caller but never abort a job.

mod analyzer;
mod decode;
mod stratum;
mod types;

pub use analyzer::{CommandAnalyzer, TempoKeyAnalyzer};
pub use decode::{AudioDecoder, FfmpegDecoder};
pub use stratum::StratumAnalyzer;
pub use types::{AnalysisError, AnalysisResult, AudioData, TempoKey, ANALYSIS_SAMPLE_RATE};

use std::path::Path;

/// Decode `path` and estimate its tempo and key.
pub fn analyze_file(
    path: &Path,
    decoder: &dyn AudioDecoder,
    analyzer: &dyn TempoKeyAnalyzer,
) -> AnalysisResult<TempoKey> {
    let audio = decoder.decode(path)?;
    analyzer.analyze(&audio)
}
