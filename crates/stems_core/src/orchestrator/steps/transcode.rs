//! Transcode step - encodes the acquired audio to a fixed-bitrate MP3.

use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome, TranscodeOutput};
use crate::process::CommandRunner;
use crate::transcode::{mp3_file_name, Transcoder};

use super::TRANSCODED_PROGRESS;

pub struct TranscodeStep;

impl TranscodeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TranscodeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TranscodeStep {
    fn name(&self) -> &str {
        "Transcode"
    }

    fn stage(&self) -> Stage {
        Stage::Transcoding
    }

    fn description(&self) -> &str {
        "Transcode to MP3"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = state
            .acquire
            .as_ref()
            .map(|a| a.path.clone())
            .ok_or_else(|| StepError::precondition_failed("No acquired audio"))?;
        let title = state.title_or_id().to_string();

        let mp3_path = ctx.work_dir.join(mp3_file_name(&title, ctx.job.bitrate));
        state.temps.register_file(&mp3_path);

        ctx.logger.info(&format!("Converting to MP3 ({})", ctx.job.bitrate));
        let spec = Transcoder::new(&ctx.settings.tools.transcoder).command(
            &input,
            &mp3_path,
            ctx.job.bitrate,
        );
        ctx.run(&spec, None, ctx)?;

        state.transcode = Some(TranscodeOutput { mp3_path });
        ctx.report_progress(TRANSCODED_PROGRESS);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let output = state
            .transcode
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("MP3 not recorded"))?;

        if !output.mp3_path.is_file() {
            return Err(StepError::invalid_output(format!(
                "Encoder produced no file at {}",
                output.mp3_path.display()
            )));
        }
        Ok(())
    }
}
