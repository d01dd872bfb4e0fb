//! Test doubles standing in for the external tools.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::analysis::{
    AnalysisError, AnalysisResult, AudioData, AudioDecoder, TempoKey, TempoKeyAnalyzer,
    ANALYSIS_SAMPLE_RATE,
};
use crate::models::SeparationModel;
use crate::process::{
    CommandRunner, CommandSpec, ProcessError, ProcessResult, ProgressWindow, RunObserver,
};
use crate::separation::expected_stems;

/// Runner that fabricates the files each tool would produce.
///
/// Tools are recognised by `CommandSpec::tool`: `yt-dlp` writes the
/// configured download, `ffmpeg` writes its last argument, `demucs` writes
/// one file per expected stem under `<-o>/<-n>/<input stem>`.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<CommandSpec>>,
    failure: Option<(String, i32, String)>,
    download_name: Option<String>,
    skip_stems: bool,
    restart_progress: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tool` exit with `code`, printing `output`.
    pub fn failing(mut self, tool: &str, code: i32, output: &str) -> Self {
        self.failure = Some((tool.to_string(), code, output.to_string()));
        self
    }

    /// Name of the file the downloader "fetches".
    pub fn with_download(mut self, file_name: &str) -> Self {
        self.download_name = Some(file_name.to_string());
        self
    }

    /// Separator exits cleanly but writes nothing.
    pub fn without_stems(mut self) -> Self {
        self.skip_stems = true;
        self
    }

    /// Separator progress restarts midway, as with bags of models.
    pub fn with_restarting_progress(mut self) -> Self {
        self.restart_progress = true;
        self
    }

    /// Recorded invocations of `tool`.
    pub fn calls_for(&self, tool: &str) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.tool == tool)
            .cloned()
            .collect()
    }

    fn emit(&self, observer: &dyn RunObserver, window: Option<ProgressWindow>, pcts: &[u8]) {
        for pct in pcts {
            observer.on_line(&format!("{:>3}%|{}|", pct, "#".repeat(usize::from(*pct / 10))));
            if let Some(window) = window {
                observer.on_progress(window.map(*pct));
            }
        }
    }

    fn download(&self, spec: &CommandSpec, window: Option<ProgressWindow>, observer: &dyn RunObserver) {
        let template = PathBuf::from(spec.arg_after("-o").unwrap_or_default());
        let dir = template.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = self.download_name.clone().unwrap_or_else(|| "download.webm".to_string());
        self.emit(observer, window, &[0, 50, 100]);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), b"webm-audio").unwrap();
    }

    fn transcode(&self, spec: &CommandSpec, observer: &dyn RunObserver) {
        observer.on_line("size=    5120kB time=00:02:10.00 bitrate= 320.0kbits/s");
        let out = PathBuf::from(spec.args.last().unwrap());
        fs::write(out, b"ID3mp3-bytes").unwrap();
    }

    fn separate(&self, spec: &CommandSpec, window: Option<ProgressWindow>, observer: &dyn RunObserver) {
        observer.on_line("Selected model is a bag of 1 models.");
        if self.restart_progress {
            self.emit(observer, window, &[0, 30, 60, 100, 0, 50, 100]);
        } else {
            self.emit(observer, window, &[0, 25, 50, 75, 100]);
        }

        let root = PathBuf::from(spec.arg_after("-o").unwrap());
        if self.skip_stems {
            return;
        }

        let model: SeparationModel = spec.arg_after("-n").unwrap().parse().unwrap();
        let input = spec
            .args
            .iter()
            .position(|a| a == "-o")
            .and_then(|i| i.checked_sub(1))
            .map(|i| PathBuf::from(&spec.args[i]))
            .unwrap();
        let ext = if spec.has_arg("--flac") {
            "flac"
        } else if spec.has_arg("--mp3") {
            "mp3"
        } else {
            "wav"
        };

        let subtree = root
            .join(model.id())
            .join(input.file_stem().unwrap());
        fs::create_dir_all(&subtree).unwrap();
        for stem in expected_stems(model, spec.has_arg("--two-stems")) {
            fs::write(subtree.join(format!("{stem}.{ext}")), stem.as_bytes()).unwrap();
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
    ) -> ProcessResult<()> {
        self.calls.lock().push(spec.clone());

        if let Some((ref tool, code, ref output)) = self.failure {
            if *tool == spec.tool {
                for line in output.lines() {
                    observer.on_line(line);
                }
                return Err(ProcessError::failed(tool, code, output));
            }
        }

        match spec.tool.as_str() {
            "yt-dlp" => self.download(spec, window, observer),
            "ffmpeg" => self.transcode(spec, observer),
            "demucs" => self.separate(spec, window, observer),
            other => panic!("unexpected tool {other}"),
        }
        Ok(())
    }
}

/// Decoder returning a second of silence.
pub struct FakeDecoder;

impl AudioDecoder for FakeDecoder {
    fn decode(&self, _path: &Path) -> AnalysisResult<AudioData> {
        Ok(AudioData::new(vec![0.0; ANALYSIS_SAMPLE_RATE as usize], ANALYSIS_SAMPLE_RATE))
    }
}

/// Analyzer with a canned answer.
pub struct FakeAnalyzer {
    result: Result<(f64, String, String), String>,
}

impl FakeAnalyzer {
    pub fn ok(bpm: f64, key: &str, scale: &str) -> Self {
        Self {
            result: Ok((bpm, key.to_string(), scale.to_string())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

impl TempoKeyAnalyzer for FakeAnalyzer {
    fn analyze(&self, _audio: &AudioData) -> AnalysisResult<TempoKey> {
        match &self.result {
            Ok((bpm, key, scale)) => Ok(TempoKey::new(*bpm, key, scale)),
            Err(message) => Err(AnalysisError::AnalyzerError(message.clone())),
        }
    }
}
