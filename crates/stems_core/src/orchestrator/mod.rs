//! Pipeline orchestrator for coordinating job execution.
//!
//! This module provides the infrastructure for running the job pipeline.
//! Each job consists of a sequence of steps that validate, execute, and
//! record their results, driven on a background thread by a
//! [`StemWorker`].
//!
//! # Architecture
//!
//! ```text
//! StemWorker (thread + event channel)
//!     └── Pipeline
//!           ├── Step: Acquire
//!           ├── Step: Analyze   (optional)
//!           ├── Step: Transcode
//!           ├── Step: Separate
//!           └── Step: Relocate
//!     └── Finalization: temp sweep, Progress(100), Done
//! ```
//!
//! # Example
//!
//! ```no_run
//! use stems_core::config::Settings;
//! use stems_core::models::{Job, ProgressEvent};
//! use stems_core::orchestrator::StemWorker;
//!
//! let job = Job::new("https://www.youtube.com/watch?v=abc123", "/music/stems");
//! let handle = StemWorker::new(job, Settings::default()).spawn();
//!
//! for event in handle.events().iter() {
//!     match event {
//!         ProgressEvent::Log { message } => println!("{}", message),
//!         ProgressEvent::Progress { percent } => println!("{}%", percent),
//!         ProgressEvent::Done { message, .. } => println!("{}", message),
//!     }
//! }
//! let outcome = handle.join();
//! assert!(outcome.success);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
#[cfg(test)]
mod test_support;
mod types;
mod worker;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AcquireStep, AnalyzeStep, RelocateStep, SeparateStep, TranscodeStep};
pub use types::{
    AcquireOutput, Context, JobState, SeparationOutput, StepOutcome, Toolchain, TranscodeOutput,
};
pub use worker::{JobOutcome, StemWorker, WorkerHandle};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Acquire - copy or download the source
/// 2. Analyze - tempo/key (never fatal)
/// 3. Transcode - fixed-bitrate MP3
/// 4. Separate - run the separation model
/// 5. Relocate - move stems and MP3 into the output folder
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(AcquireStep::new())
        .with_step(AnalyzeStep::new())
        .with_step(TranscodeStep::new())
        .with_step(SeparateStep::new())
        .with_step(RelocateStep::new())
}
