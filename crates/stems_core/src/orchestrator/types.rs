//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::Serialize;

use crate::analysis::{
    AudioDecoder, CommandAnalyzer, FfmpegDecoder, StratumAnalyzer, TempoKey, TempoKeyAnalyzer,
};
use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{Job, ProgressEvent, Stage};
use crate::process::{
    CommandRunner, CommandSpec, ProcessResult, ProgressWindow, RunObserver, SystemRunner,
};
use crate::relocate::RelocationReport;
use crate::scratch::TempRegistry;
use crate::separation::StemWriter;

/// External collaborators used by the pipeline steps.
///
/// Swapping any of these swaps the corresponding tool without touching
/// the steps.
#[derive(Clone)]
pub struct Toolchain {
    /// Runs downloader, transcoder and separator commands.
    pub runner: Arc<dyn CommandRunner>,
    /// Decodes audio for analysis.
    pub decoder: Arc<dyn AudioDecoder>,
    /// Tempo/key estimator. `None` skips analysis.
    pub analyzer: Option<Arc<dyn TempoKeyAnalyzer>>,
    /// Stem encoding override. `None` uses the job's stem format.
    pub writer: Option<Arc<dyn StemWriter>>,
}

impl Toolchain {
    /// Real tools as configured in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let analyzer: Option<Arc<dyn TempoKeyAnalyzer>> = if !settings.analysis.enabled {
            None
        } else if let Some(command) = settings.analysis.external_command() {
            Some(Arc::new(CommandAnalyzer::new(
                command,
                settings.analysis.args.clone(),
            )))
        } else {
            Some(Arc::new(StratumAnalyzer::new()))
        };

        Self {
            runner: Arc::new(SystemRunner::new()),
            decoder: Arc::new(FfmpegDecoder::new(&settings.tools.transcoder)),
            analyzer,
            writer: None,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Option<Arc<dyn TempoKeyAnalyzer>>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn StemWriter>) -> Self {
        self.writer = Some(writer);
        self
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains job configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Job being run.
    pub job: Job,
    /// Application settings.
    pub settings: Settings,
    /// Job name used in logs and errors.
    pub job_name: String,
    /// Job-private scratch directory (under temp_root).
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// External tools.
    pub tools: Toolchain,
    /// Event stream to the presentation layer.
    events: Option<Sender<ProgressEvent>>,
    /// Last progress value emitted.
    last_progress: Mutex<Option<u8>>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        job: Job,
        settings: Settings,
        job_name: impl Into<String>,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
        tools: Toolchain,
    ) -> Self {
        Self {
            job,
            settings,
            job_name: job_name.into(),
            work_dir,
            logger,
            tools,
            events: None,
            last_progress: Mutex::new(None),
        }
    }

    /// Send progress events to `events`.
    pub fn with_events(mut self, events: Sender<ProgressEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Report overall job progress.
    ///
    /// Values below the last reported one (and repeats) are dropped, so
    /// the event stream never regresses.
    pub fn report_progress(&self, percent: u8) {
        let percent = percent.min(100);
        {
            let mut last = self.last_progress.lock();
            if matches!(*last, Some(prev) if percent <= prev) {
                return;
            }
            *last = Some(percent);
        }

        self.logger.progress(u32::from(percent));
        if let Some(ref events) = self.events {
            let _ = events.send(ProgressEvent::progress(percent));
        }
    }

    /// Last reported progress, 0 if nothing was reported yet.
    pub fn progress(&self) -> u8 {
        self.last_progress.lock().unwrap_or(0)
    }

    /// Stem writer for this job.
    pub fn stem_writer(&self) -> &dyn StemWriter {
        match self.tools.writer {
            Some(ref writer) => writer.as_ref(),
            None => &self.job.stem_format,
        }
    }
}

impl RunObserver for Context {
    fn on_line(&self, line: &str) {
        self.logger.tool_line(line);
    }

    fn on_progress(&self, percent: u8) {
        self.report_progress(percent);
    }
}

/// Commands run through the context are logged before they start.
impl CommandRunner for Context {
    fn run(
        &self,
        spec: &CommandSpec,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
    ) -> ProcessResult<()> {
        self.logger.command(&spec.display());
        self.logger.clear_tail();
        self.tools.runner.run(spec, window, observer)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Each step's output is stored in its own section. Temp paths are
/// registered here as soon as they are created.
#[derive(Debug, Default, Serialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Current position in the state machine.
    pub stage: Stage,
    /// Overall progress after the last completed step.
    pub progress: u8,
    /// Sanitized title (set by the Acquire step).
    pub title: Option<String>,
    /// Temp files and directories to sweep when the job ends.
    pub temps: TempRegistry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquire: Option<AcquireOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TempoKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode: Option<TranscodeOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separation: Option<SeparationOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocation: Option<RelocationReport>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Title, or the job id before acquisition.
    pub fn title_or_id(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.job_id)
    }
}

/// Output from the Acquire step.
#[derive(Debug, Clone, Serialize)]
pub struct AcquireOutput {
    /// Local audio file in the scratch directory.
    pub path: PathBuf,
    /// Whether it was downloaded.
    pub remote: bool,
}

/// Output from the Transcode step.
#[derive(Debug, Clone, Serialize)]
pub struct TranscodeOutput {
    pub mp3_path: PathBuf,
}

/// Output from the Separate step.
#[derive(Debug, Clone, Serialize)]
pub struct SeparationOutput {
    /// Root passed to the separator with `-o`.
    pub scratch_root: PathBuf,
    /// File the separator was given.
    pub input: PathBuf,
    /// Where the separator should have written the stems.
    pub subtree: PathBuf,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (not an error).
    Skipped(String),
}
