//! Pipeline runner that executes steps in sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// The pipeline executes steps in order, running validation before
/// and after each step. It handles cancellation and tracks which
/// steps were executed.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
    /// Cancellation flag.
    cancelled: CancelHandle,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cancelled: CancelHandle::new(),
        }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Use an existing cancellation handle (e.g. one already handed to a
    /// front end).
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancelled = handle;
        self
    }

    /// Get a cancellation handle.
    ///
    /// Call `cancel()` on the returned handle to stop the pipeline
    /// at the next step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancelled.clone()
    }

    /// Check if pipeline has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Executes each step in order:
    /// 1. Check for cancellation
    /// 2. Run `validate_input`
    /// 3. Run `execute`
    /// 4. Run `validate_output` (if execute returned Success)
    ///
    /// The first required step to fail stops the run. Failures of optional
    /// steps are logged as warnings and recorded as skipped.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        for step in &self.steps {
            if self.is_cancelled() {
                ctx.logger
                    .warn(&format!("Pipeline cancelled before step '{}'", step.name()));
                return Err(PipelineError::cancelled(&ctx.job_name));
            }

            let step_name = step.name();
            state.stage = step.stage();
            ctx.logger.phase(step.description());
            tracing::debug!("[{}] entering {}", ctx.job_name, state.stage);

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            let outcome = match step.execute(ctx, state) {
                Ok(outcome) => outcome,
                Err(e) if step.is_optional() => {
                    ctx.logger.warn(&format!("{} failed: {}", step_name, e));
                    StepOutcome::Skipped(e.to_string())
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed", step_name));
                    return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
                }
            };

            match outcome {
                StepOutcome::Success => {
                    ctx.logger
                        .debug(&format!("Validating output for '{}'", step_name));
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.logger.error(&format!("Output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
                    }

                    ctx.logger.debug(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger.info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }

            state.progress = ctx.progress();
        }

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the pipeline.
    ///
    /// The pipeline will stop at the next step boundary. A running
    /// external command is not interrupted.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::{Job, Stage};
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::types::Toolchain;
    use std::sync::atomic::AtomicUsize;
    use tempfile::tempdir;

    struct CountingStep {
        name: &'static str,
        stage: Stage,
        fail: bool,
        optional: bool,
        execute_count: Arc<AtomicUsize>,
    }

    impl CountingStep {
        fn new(name: &'static str, stage: Stage, counter: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                stage,
                fail: false,
                optional: false,
                execute_count: Arc::clone(counter),
            }
        }
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn stage(&self) -> Stage {
            self.stage
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StepError::other("boom"));
            }
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }

        fn is_optional(&self) -> bool {
            self.optional
        }
    }

    fn context(dir: &std::path::Path) -> Context {
        let logger = Arc::new(JobLogger::new("pipeline", dir, LogConfig::default(), None).unwrap());
        Context::new(
            Job::new("song.wav", dir),
            Settings::default(),
            "pipeline",
            dir.to_path_buf(),
            logger,
            Toolchain::from_settings(&Settings::default()),
        )
    }

    #[test]
    fn pipeline_builds_correctly() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("Step1", Stage::Acquiring, &counter))
            .with_step(CountingStep::new("Step2", Stage::Transcoding, &counter));

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn cancel_handle_works() {
        let pipeline = Pipeline::new();
        let handle = pipeline.cancel_handle();

        assert!(!pipeline.is_cancelled());
        assert!(!handle.is_cancelled());

        handle.cancel();

        assert!(pipeline.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn runs_steps_in_order_and_tracks_stage() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let counter = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("Acquire", Stage::Acquiring, &counter))
            .with_step(CountingStep::new("Separate", Stage::Separating, &counter));

        let mut state = JobState::new("job");
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(result.steps_completed, vec!["Acquire", "Separate"]);
        assert!(result.all_completed());
        assert_eq!(state.stage, Stage::Separating);
    }

    #[test]
    fn required_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut failing = CountingStep::new("Transcode", Stage::Transcoding, &counter);
        failing.fail = true;
        let pipeline = Pipeline::new()
            .with_step(failing)
            .with_step(CountingStep::new("Separate", Stage::Separating, &counter));

        let mut state = JobState::new("job");
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert_eq!(err.step_name(), Some("Transcode"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(state.stage, Stage::Transcoding);
    }

    #[test]
    fn optional_failure_is_skipped() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut analyze = CountingStep::new("Analyze", Stage::Analyzing, &counter);
        analyze.fail = true;
        analyze.optional = true;
        let pipeline = Pipeline::new()
            .with_step(analyze)
            .with_step(CountingStep::new("Transcode", Stage::Transcoding, &counter));

        let mut state = JobState::new("job");
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(result.steps_skipped, vec!["Analyze"]);
        assert_eq!(result.steps_completed, vec!["Transcode"]);
        assert_eq!(result.total_steps(), 2);
    }

    #[test]
    fn cancelled_pipeline_runs_nothing() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = CancelHandle::new();
        let pipeline = Pipeline::new()
            .with_cancel_handle(handle.clone())
            .with_step(CountingStep::new("Acquire", Stage::Acquiring, &counter));

        handle.cancel();
        let mut state = JobState::new("job");
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
