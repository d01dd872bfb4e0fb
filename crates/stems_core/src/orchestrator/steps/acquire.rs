//! Acquire step - makes the job's source available as a local file.

use crate::acquire::{acquire_local, Downloader};
use crate::models::{has_supported_extension, JobSource, Stage, SUPPORTED_EXTENSIONS};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{AcquireOutput, Context, JobState, StepOutcome};

use super::{ACQUIRED_PROGRESS, DOWNLOAD_WINDOW};

/// Copies a local file or downloads a URL into the job's work directory.
pub struct AcquireStep;

impl AcquireStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AcquireStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AcquireStep {
    fn name(&self) -> &str {
        "Acquire"
    }

    fn stage(&self) -> Stage {
        Stage::Acquiring
    }

    fn description(&self) -> &str {
        "Acquire source audio"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.job.source.trim().is_empty() {
            return Err(StepError::invalid_input("No source given"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        ctx.report_progress(0);

        let acquired = match ctx.job.source_kind() {
            JobSource::Local(path) => {
                if path.is_file() && !has_supported_extension(&path) {
                    ctx.logger.warn(&format!(
                        "{} is not one of {}; trying anyway",
                        path.display(),
                        SUPPORTED_EXTENSIONS.join(", ")
                    ));
                }
                ctx.logger.info(&format!("Copying local file {}", path.display()));
                let acquired = acquire_local(&path, &ctx.work_dir)?;
                state.temps.register_file(&acquired.path);
                acquired
            }
            JobSource::Remote(url) => {
                ctx.logger.info(&format!("Downloading audio from {}", url));
                let download_dir = ctx.work_dir.join("download");
                state.temps.register_dir(&download_dir);
                let downloader = Downloader::new(&ctx.settings.tools.downloader);
                let acquired = downloader.download(ctx, &url, &download_dir, DOWNLOAD_WINDOW, ctx)?;
                state.temps.register_file(&acquired.path);
                acquired
            }
        };

        ctx.logger.info(&format!("Title: {}", acquired.title));
        state.title = Some(acquired.title);
        state.acquire = Some(AcquireOutput {
            path: acquired.path,
            remote: acquired.remote,
        });

        ctx.report_progress(ACQUIRED_PROGRESS);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let output = state
            .acquire
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Acquired file not recorded"))?;

        if !output.path.is_file() {
            return Err(StepError::file_not_found(output.path.display().to_string()));
        }
        if state.title.as_deref().map_or(true, str::is_empty) {
            return Err(StepError::invalid_output("Title not set"));
        }
        Ok(())
    }
}
