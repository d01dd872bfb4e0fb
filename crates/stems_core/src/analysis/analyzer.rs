//! Tempo/key estimation through an external command.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use serde::Deserialize;

use super::types::{AnalysisError, AnalysisResult, AudioData, TempoKey};

/// Estimates tempo and key from decoded audio.
pub trait TempoKeyAnalyzer: Send + Sync {
    fn analyze(&self, audio: &AudioData) -> AnalysisResult<TempoKey>;
}

/// JSON object the analyzer command prints on stdout.
#[derive(Debug, Deserialize)]
struct AnalyzerOutput {
    bpm: f64,
    key: String,
    scale: String,
}

/// Analyzer that pipes raw samples to an external command.
///
/// The command receives little-endian f32 mono samples on stdin and
/// `--sample-rate <hz>` as its last arguments, and answers with
/// `{"bpm": 128.0, "key": "F#", "scale": "minor"}` on stdout.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn full_args(&self, sample_rate: u32) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("--sample-rate".to_string());
        args.push(sample_rate.to_string());
        args
    }
}

impl TempoKeyAnalyzer for CommandAnalyzer {
    fn analyze(&self, audio: &AudioData) -> AnalysisResult<TempoKey> {
        if audio.is_empty() {
            return Err(AnalysisError::InvalidAudio("No samples to analyze".to_string()));
        }

        let mut child = Command::new(&self.program)
            .args(self.full_args(audio.sample_rate))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalysisError::AnalyzerError(format!("Failed to spawn {}: {}", self.program, e)))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let payload = audio.to_le_bytes();

        let (out, err) = thread::scope(|scope| {
            scope.spawn(move || {
                if let Some(mut stdin) = stdin {
                    // The analyzer may stop reading early; its exit status decides.
                    let _ = stdin.write_all(&payload);
                }
            });
            let err_reader = scope.spawn(move || read_all(stderr));
            let out = read_all(stdout);
            (out, err_reader.join().unwrap_or_default())
        });

        let status = child
            .wait()
            .map_err(|e| AnalysisError::AnalyzerError(format!("Analyzer process error: {}", e)))?;

        if !status.success() {
            return Err(AnalysisError::AnalyzerError(format!(
                "{} exited with code {:?}: {}",
                self.program,
                status.code(),
                err.trim()
            )));
        }

        parse_output(&out)
    }
}

fn read_all(reader: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parse the analyzer's stdout. The last line that looks like a JSON
/// object wins, so chatty tools still work.
fn parse_output(stdout: &str) -> AnalysisResult<TempoKey> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
        .ok_or_else(|| AnalysisError::InvalidOutput("no JSON object on stdout".to_string()))?;

    let parsed: AnalyzerOutput =
        serde_json::from_str(line).map_err(|e| AnalysisError::InvalidOutput(e.to_string()))?;

    if !parsed.bpm.is_finite() || parsed.bpm <= 0.0 {
        return Err(AnalysisError::InvalidOutput(format!("bad tempo {}", parsed.bpm)));
    }

    let scale = parsed.scale.trim().to_ascii_lowercase();
    if scale != "major" && scale != "minor" {
        return Err(AnalysisError::InvalidOutput(format!("unknown scale '{}'", parsed.scale)));
    }
    if parsed.key.trim().is_empty() {
        return Err(AnalysisError::InvalidOutput("empty key".to_string()));
    }

    Ok(TempoKey::new(parsed.bpm, &parsed.key, &scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::ANALYSIS_SAMPLE_RATE;

    #[test]
    fn parses_json_output() {
        let tk = parse_output(r#"{"bpm": 127.8, "key": "A", "scale": "minor"}"#).unwrap();
        assert_eq!(tk.tempo_bpm, 128);
        assert_eq!(tk.key_label, "A minor");
    }

    #[test]
    fn ignores_leading_chatter() {
        let out = "loading model...\n{\"bpm\": 90.2, \"key\": \"Eb\", \"scale\": \"Major\"}\n";
        let tk = parse_output(out).unwrap();
        assert_eq!(tk.tempo_bpm, 90);
        assert_eq!(tk.key_label, "Eb major");
    }

    #[test]
    fn rejects_bad_output() {
        assert!(parse_output("").is_err());
        assert!(parse_output(r#"{"bpm": 120}"#).is_err());
        assert!(parse_output(r#"{"bpm": 120, "key": "C", "scale": "dorian"}"#).is_err());
        assert!(parse_output(r#"{"bpm": -3, "key": "C", "scale": "major"}"#).is_err());
    }

    #[test]
    fn appends_sample_rate() {
        let analyzer = CommandAnalyzer::new("keyfinder", vec!["--json".to_string()]);
        assert_eq!(
            analyzer.full_args(44_100),
            vec!["--json", "--sample-rate", "44100"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn runs_external_command() {
        let script = r#"cat > /dev/null; echo '{"bpm": 120.4, "key": "C", "scale": "major"}'"#;
        let analyzer = CommandAnalyzer::new("sh", vec!["-c".to_string(), script.to_string()]);
        let audio = AudioData::new(vec![0.1; 44_100], ANALYSIS_SAMPLE_RATE);

        let tk = analyzer.analyze(&audio).unwrap();
        assert_eq!(tk.tempo_bpm, 120);
        assert_eq!(tk.key_label, "C major");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_an_error() {
        let analyzer = CommandAnalyzer::new(
            "sh",
            vec!["-c".to_string(), "echo 'no model' >&2; exit 4".to_string()],
        );
        let audio = AudioData::new(vec![0.0; 16], ANALYSIS_SAMPLE_RATE);

        let err = analyzer.analyze(&audio).unwrap_err();
        assert!(err.to_string().contains("no model"));
    }
}
