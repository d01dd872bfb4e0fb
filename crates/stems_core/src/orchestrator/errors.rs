//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::acquire::AcquireError;
use crate::process::ProcessError;
use crate::relocate::RelocateError;

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Pipeline was cancelled.
    #[error("Job '{job_name}' was cancelled")]
    Cancelled { job_name: String },

    /// Failed to set up job (create directories, open log file).
    #[error("Job '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(job_name: impl Into<String>) -> Self {
        Self::Cancelled {
            job_name: job_name.into(),
        }
    }

    /// Name of the step that failed, if any.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step_name, .. } => Some(step_name.as_str()),
            _ => None,
        }
    }

    /// Exit code of the external tool behind this failure, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::StepFailed {
                source: StepError::CommandFailed { exit_code, .. },
                ..
            } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// An external command failed.
    #[error("{tool} failed with exit code {exit_code}:\n{message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// An external command could not be started.
    #[error("Could not run {program}: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<ProcessError> for StepError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Failed {
                tool,
                exit_code,
                output,
            } => Self::command_failed(tool, exit_code, output),
            ProcessError::SpawnFailed { program, source } => {
                Self::ToolUnavailable { program, source }
            }
            ProcessError::Io { program, source } => {
                Self::io_error(format!("reading output of {}", program), source)
            }
        }
    }
}

impl From<AcquireError> for StepError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::NotFound { path } => Self::file_not_found(path.display().to_string()),
            AcquireError::Io { operation, source } => Self::io_error(operation, source),
            AcquireError::Download(process) => process.into(),
            other @ AcquireError::NothingDownloaded { .. } => Self::other(other.to_string()),
        }
    }
}

impl From<RelocateError> for StepError {
    fn from(err: RelocateError) -> Self {
        Self::other(err.to_string())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_displays_context() {
        let err = StepError::command_failed("demucs", 2, "Invalid model name");
        let msg = err.to_string();
        assert!(msg.contains("demucs"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("Invalid model name"));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::file_not_found("/path/to/song.wav");
        let pipeline_err = PipelineError::step_failed("song", "Acquire", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("song"));
        assert!(msg.contains("Acquire"));
        assert_eq!(pipeline_err.step_name(), Some("Acquire"));
        assert_eq!(pipeline_err.exit_code(), None);
    }

    #[test]
    fn process_failure_keeps_exit_code_and_output() {
        let step: StepError = ProcessError::failed("demucs", 137, "Killed").into();
        let err = PipelineError::step_failed("song", "Separate", step);

        assert_eq!(err.exit_code(), Some(137));
        assert!(err.to_string().contains("Killed"));
    }

    #[test]
    fn missing_tool_names_program() {
        let step: StepError = ProcessError::spawn_failed(
            "yt-dlp",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        )
        .into();
        assert!(step.to_string().contains("Could not run yt-dlp"));
    }

    #[test]
    fn acquire_errors_map_to_step_errors() {
        let step: StepError = AcquireError::not_found("/music/ghost.mp3").into();
        assert!(matches!(step, StepError::FileNotFound { .. }));

        let step: StepError = AcquireError::Download(ProcessError::failed("yt-dlp", 1, "ERROR: 404")).into();
        assert!(matches!(step, StepError::CommandFailed { exit_code: 1, .. }));
    }
}
