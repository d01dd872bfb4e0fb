//! Relocate step - moves stems and the MP3 into the output folder.

use crate::logging::MessagePrefix;
use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::relocate::{relocate, RelocationRequest};

pub struct RelocateStep;

impl RelocateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RelocateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RelocateStep {
    fn name(&self) -> &str {
        "Relocate"
    }

    fn stage(&self) -> Stage {
        Stage::Relocating
    }

    fn description(&self) -> &str {
        "Move stems to output folder"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.job.output_dir.as_os_str().is_empty() {
            return Err(StepError::invalid_input("No output directory"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let separation = state
            .separation
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Separation did not run"))?;
        let mp3 = state
            .transcode
            .as_ref()
            .map(|t| t.mp3_path.as_path())
            .ok_or_else(|| StepError::precondition_failed("No transcoded MP3"))?;
        let title = state.title_or_id();

        ctx.logger.info("Moving stems to output folder...");
        let request = RelocationRequest {
            scratch_root: &separation.scratch_root,
            model: ctx.job.model,
            separator_input: &separation.input,
            title,
            output_dir: &ctx.job.output_dir,
            mp3,
        };
        let report = relocate(&request)?;

        for stem in &report.stems {
            if let Some(name) = stem.file_name() {
                ctx.logger
                    .info(&MessagePrefix::ToolOutput.format(&name.to_string_lossy()));
            }
        }
        if let Some(ref missing) = report.missing_subtree {
            ctx.logger.warn(&format!(
                "Expected stems folder not found at {}",
                missing.display()
            ));
        }
        if let Some(ref mp3) = report.mp3_path {
            ctx.logger.info(&format!("MP3 saved to {}", mp3.display()));
        }

        state.relocation = Some(report);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let report = state
            .relocation
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Relocation not recorded"))?;

        match report.mp3_path {
            Some(ref mp3) if mp3.is_file() => Ok(()),
            _ => Err(StepError::invalid_output("MP3 was not delivered")),
        }
    }
}
