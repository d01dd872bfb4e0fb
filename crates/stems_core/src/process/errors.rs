//! Errors raised while running external commands.

use std::io;

use thiserror::Error;

/// Failure of an external command.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started (usually missing from PATH).
    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited unsuccessfully.
    ///
    /// `output` aggregates both captured streams.
    #[error("{tool} failed (exit {exit_code}):\n{output}")]
    Failed {
        tool: String,
        exit_code: i32,
        output: String,
    },

    /// Reading the program's output or waiting for it failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    pub fn spawn_failed(program: impl Into<String>, source: io::Error) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    pub fn failed(tool: impl Into<String>, exit_code: i32, output: impl Into<String>) -> Self {
        Self::Failed {
            tool: tool.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn io(program: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            program: program.into(),
            source,
        }
    }

    /// Exit code of a failed command, if it ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_displays_exit_code_and_output() {
        let err = ProcessError::failed("demucs", 2, "FATAL: model not found");
        let msg = err.to_string();
        assert!(msg.contains("demucs"));
        assert!(msg.contains("exit 2"));
        assert!(msg.contains("FATAL: model not found"));
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn spawn_failure_names_program() {
        let err = ProcessError::spawn_failed(
            "yt-dlp",
            io::Error::new(io::ErrorKind::NotFound, "No such file"),
        );
        assert!(err.to_string().contains("yt-dlp"));
        assert_eq!(err.exit_code(), None);
    }
}
