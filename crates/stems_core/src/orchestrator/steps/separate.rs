//! Separate step - runs the separation model on the transcoded MP3.

use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, SeparationOutput, StepOutcome};
use crate::process::CommandRunner;
use crate::separation::{output_subtree, Separator};

use super::{SEPARATED_PROGRESS, SEPARATION_WINDOW};

pub struct SeparateStep;

impl SeparateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SeparateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SeparateStep {
    fn name(&self) -> &str {
        "Separate"
    }

    fn stage(&self) -> Stage {
        Stage::Separating
    }

    fn description(&self) -> &str {
        "Separate stems"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.settings.tools.separator.trim().is_empty() {
            return Err(StepError::invalid_input("No separator configured"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = state
            .transcode
            .as_ref()
            .map(|t| t.mp3_path.clone())
            .ok_or_else(|| StepError::precondition_failed("No transcoded MP3"))?;

        let scratch_root = ctx.work_dir.join("separated");
        state.temps.register_dir(&scratch_root);

        let job = &ctx.job;
        ctx.logger.info(&format!(
            "Separating with {}{}",
            job.model.description(),
            if job.two_stems { ", vocals only" } else { "" }
        ));

        let spec = Separator::from_settings(&ctx.settings.tools).command(
            &input,
            &scratch_root,
            job.model,
            job.two_stems,
            ctx.stem_writer(),
            job.bitrate,
        );
        ctx.run(&spec, Some(SEPARATION_WINDOW), ctx)?;

        state.separation = Some(SeparationOutput {
            subtree: output_subtree(&scratch_root, job.model, &input),
            scratch_root,
            input,
        });
        ctx.report_progress(SEPARATED_PROGRESS);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.separation.is_none() {
            return Err(StepError::invalid_output("Separation not recorded"));
        }
        Ok(())
    }
}
