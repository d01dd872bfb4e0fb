//! Analyze step - estimates tempo and key of the acquired audio.
//!
//! Analysis never fails the job: errors are logged as warnings and the
//! step is recorded as skipped.

use crate::analysis::analyze_file;
use crate::models::Stage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

pub struct AnalyzeStep;

impl AnalyzeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AnalyzeStep {
    fn name(&self) -> &str {
        "Analyze"
    }

    fn stage(&self) -> Stage {
        Stage::Analyzing
    }

    fn description(&self) -> &str {
        "Analyze tempo and key"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if !ctx.settings.analysis.enabled {
            return Ok(StepOutcome::Skipped("analysis disabled".to_string()));
        }
        let Some(analyzer) = ctx.tools.analyzer.as_deref() else {
            return Ok(StepOutcome::Skipped("no analyzer configured".to_string()));
        };

        let input = state
            .acquire
            .as_ref()
            .map(|a| a.path.clone())
            .ok_or_else(|| StepError::precondition_failed("No acquired audio"))?;

        ctx.logger.info("Analyzing tempo and key...");
        match analyze_file(&input, ctx.tools.decoder.as_ref(), analyzer) {
            Ok(tempo_key) => {
                ctx.logger.info(&format!("Tempo: {} BPM", tempo_key.tempo_bpm));
                ctx.logger.info(&format!("Key: {}", tempo_key.key_label));
                state.analysis = Some(tempo_key);
                Ok(StepOutcome::Success)
            }
            Err(e) => {
                ctx.logger.warn(&format!("Could not analyze tempo/key: {}", e));
                Ok(StepOutcome::Skipped(format!("analysis failed: {}", e)))
            }
        }
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.analysis.is_none() {
            return Err(StepError::invalid_output("Analysis result not recorded"));
        }
        Ok(())
    }

    fn is_optional(&self) -> bool {
        true
    }
}
