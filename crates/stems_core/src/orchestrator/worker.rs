//! Background worker running one job.
//!
//! A [`StemWorker`] is consumed by running it, so one instance runs
//! exactly one job. Events flow to the consumer over an unbounded
//! channel in emission order, ending with exactly one `Done`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use uuid::Uuid;

use super::errors::PipelineError;
use super::pipeline::{CancelHandle, Pipeline, PipelineRunResult};
use super::types::{Context, JobState, Toolchain};
use super::create_standard_pipeline;
use crate::acquire::title_or_default;
use crate::analysis::TempoKey;
use crate::config::Settings;
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::models::{Job, JobSource, ProgressEvent, Stage};
use crate::scratch::CleanupReport;

/// Final result of a job, returned from the worker thread.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: String,
    pub success: bool,
    /// Same text as the terminal `Done` event.
    pub message: String,
    /// Stage reached (`Done` or `Failed`).
    pub stage: Stage,
    pub title: Option<String>,
    /// Destination stems directory.
    pub stems_dir: Option<PathBuf>,
    /// Delivered MP3.
    pub mp3_path: Option<PathBuf>,
    /// Expected stems directory that was not found.
    pub missing_stems: Option<PathBuf>,
    pub tempo_key: Option<TempoKey>,
    pub log_path: Option<PathBuf>,
    pub cleanup: CleanupReport,
}

impl JobOutcome {
    fn failed(job_id: &str, message: String) -> Self {
        Self {
            job_id: job_id.to_string(),
            success: false,
            message,
            stage: Stage::Failed,
            title: None,
            stems_dir: None,
            mp3_path: None,
            missing_stems: None,
            tempo_key: None,
            log_path: None,
            cleanup: CleanupReport::default(),
        }
    }
}

/// Handle to a spawned worker.
pub struct WorkerHandle {
    events: Receiver<ProgressEvent>,
    cancel: CancelHandle,
    join: JoinHandle<JobOutcome>,
    job_id: String,
}

impl WorkerHandle {
    /// Ordered event stream of the job.
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop the job at the next stage boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the job to finish.
    pub fn join(self) -> JobOutcome {
        let job_id = self.job_id;
        self.join.join().unwrap_or_else(|_| {
            tracing::error!("Worker thread for job {} panicked", job_id);
            JobOutcome::failed(&job_id, "Error: worker thread panicked".to_string())
        })
    }

    /// Drain every event, then wait for the job.
    pub fn wait(self) -> (Vec<ProgressEvent>, JobOutcome) {
        let events: Vec<ProgressEvent> = self.events.iter().collect();
        (events, self.join())
    }
}

/// Runs one job through the standard pipeline.
pub struct StemWorker {
    job: Job,
    settings: Settings,
    tools: Toolchain,
    pipeline: Pipeline,
    job_id: String,
    cancel: CancelHandle,
}

impl StemWorker {
    /// Worker using the real tools configured in `settings`.
    pub fn new(job: Job, settings: Settings) -> Self {
        let tools = Toolchain::from_settings(&settings);
        Self {
            job,
            settings,
            tools,
            pipeline: create_standard_pipeline(),
            job_id: Uuid::new_v4().to_string(),
            cancel: CancelHandle::new(),
        }
    }

    /// Replace the external tools.
    pub fn with_toolchain(mut self, tools: Toolchain) -> Self {
        self.tools = tools;
        self
    }

    /// Replace the step sequence. Cleanup and the terminal events still
    /// run after the last step.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the job on a background thread.
    pub fn spawn(self) -> WorkerHandle {
        let (tx, rx) = unbounded();
        let cancel = self.cancel.clone();
        let job_id = self.job_id.clone();

        let join = thread::spawn(move || self.run(tx));

        WorkerHandle {
            events: rx,
            cancel,
            join,
            job_id,
        }
    }

    /// Run the job on the current thread, sending events to `events`.
    ///
    /// Sends exactly one `Done` event, after temp cleanup.
    pub fn run(self, events: Sender<ProgressEvent>) -> JobOutcome {
        let Self {
            job,
            settings,
            tools,
            pipeline,
            job_id,
            cancel,
        } = self;

        let job_name = job_display_name(&job, &job_id);
        let mut state = JobState::new(&job_id);

        let ctx = match setup(&job, &settings, &job_name, &job_id, &events) {
            Ok((work_dir, logger)) => {
                state.temps.register_dir(&work_dir);
                Context::new(job, settings, &job_name, work_dir, logger, tools)
                    .with_events(events.clone())
            }
            Err(e) => {
                let message = format!("Error: {}", e);
                tracing::error!("{}", message);
                let _ = events.send(ProgressEvent::done(false, message.clone()));
                return JobOutcome::failed(&job_id, message);
            }
        };

        ctx.logger.info(&format!("Source: {}", ctx.job.source.trim()));
        ctx.logger.info(&format!("Settings: {}", ctx.job.summary()));
        ctx.logger.file_only(&format!("Job id: {}", job_id));

        let result = pipeline
            .with_cancel_handle(cancel)
            .run(&ctx, &mut state);

        let (success, message) = finish_message(&ctx, &mut state, &result);

        // Cleanup output stays out of the event stream.
        let cleanup = std::mem::take(&mut state.temps).sweep();
        for (path, err) in &cleanup.failed {
            ctx.logger
                .file_only(&format!("Could not remove temp {}: {}", path.display(), err));
        }
        ctx.logger
            .file_only(&format!("Removed {} temp path(s)", cleanup.removed.len()));

        if success {
            ctx.report_progress(100);
        }
        ctx.logger.file_only(&message);
        ctx.logger.flush();
        let _ = events.send(ProgressEvent::done(success, message.clone()));

        let relocation = state.relocation.take().unwrap_or_default();
        let outcome = JobOutcome {
            job_id,
            success,
            message,
            stage: state.stage,
            title: state.title.take(),
            stems_dir: relocation.stems_dir,
            mp3_path: relocation.mp3_path,
            missing_stems: relocation.missing_subtree,
            tempo_key: state.analysis.take(),
            log_path: Some(ctx.logger.log_path().to_path_buf()),
            cleanup,
        };
        ctx.logger.close();
        outcome
    }
}

/// Name used for the log file and in error messages: the local file's
/// title, or the job id for remote sources.
fn job_display_name(job: &Job, job_id: &str) -> String {
    match job.source_kind() {
        JobSource::Local(path) => path
            .file_stem()
            .map(|s| title_or_default(&s.to_string_lossy()))
            .unwrap_or_else(|| job_id.to_string()),
        JobSource::Remote(_) => job_id.to_string(),
    }
}

/// Create the work directory and the job logger.
fn setup(
    job: &Job,
    settings: &Settings,
    job_name: &str,
    job_id: &str,
    events: &Sender<ProgressEvent>,
) -> Result<(PathBuf, Arc<JobLogger>), PipelineError> {
    let work_dir = Path::new(&settings.paths.temp_root).join(job_id);
    fs::create_dir_all(&work_dir).map_err(|e| {
        PipelineError::setup_failed(
            job_name,
            format!("cannot create work directory {}: {}", work_dir.display(), e),
        )
    })?;

    let sender = events.clone();
    let callback: LogCallback = Box::new(move |line| {
        let _ = sender.send(ProgressEvent::log(line));
    });

    let logs_dir = Path::new(&settings.paths.logs_folder);
    let logger = JobLogger::new(
        job_name,
        logs_dir,
        LogConfig::from(&settings.logging),
        Some(callback),
    )
    .map_err(|e| {
        let _ = fs::remove_dir_all(&work_dir);
        PipelineError::setup_failed(
            job_name,
            format!("cannot open log file in {}: {}", logs_dir.display(), e),
        )
    })?;

    tracing::info!(
        "Job {} ({}) -> {}",
        job_id,
        job_name,
        job.output_dir.display()
    );

    Ok((work_dir, Arc::new(logger)))
}

/// Decide the terminal stage and message. Logs failures before cleanup.
fn finish_message(
    ctx: &Context,
    state: &mut JobState,
    result: &Result<PipelineRunResult, PipelineError>,
) -> (bool, String) {
    match result {
        Ok(run) => {
            state.stage = Stage::Done;
            tracing::debug!(
                "Job {} finished: {} completed, {} skipped",
                state.job_id,
                run.steps_completed.len(),
                run.steps_skipped.len()
            );

            let relocation = state.relocation.as_ref();
            let message = match relocation.and_then(|r| r.stems_dir.as_ref()) {
                Some(dir) => format!("Finished - stems ready in {}", dir.display()),
                None => {
                    let expected = relocation
                        .and_then(|r| r.missing_subtree.as_ref())
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    format!(
                        "Finished with warnings - no stems found at {}; MP3 saved to {}",
                        expected,
                        ctx.job.output_dir.display()
                    )
                }
            };
            ctx.logger.success(&message);
            (true, message)
        }
        Err(e) => {
            state.stage = Stage::Failed;
            if let Some(step) = e.step_name() {
                ctx.logger.dump_tail(step);
            }
            let message = format!("Error: {}", e);
            ctx.logger.error(&e.to_string());
            (false, message)
        }
    }
}
