//! Events delivered from a running job to the presentation layer.

use serde::{Deserialize, Serialize};

/// One entry in a job's ordered event stream.
///
/// A job emits any number of `Log` and `Progress` events followed by
/// exactly one `Done`. Progress percentages never decrease within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A human-readable log line.
    Log { message: String },
    /// Overall job progress, 0..=100.
    Progress { percent: u8 },
    /// Terminal result of the job.
    Done { success: bool, message: String },
}

impl ProgressEvent {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub fn progress(percent: u8) -> Self {
        Self::Progress {
            percent: percent.min(100),
        }
    }

    pub fn done(success: bool, message: impl Into<String>) -> Self {
        Self::Done {
            success,
            message: message.into(),
        }
    }

    /// Whether this is the terminal event of a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    /// Progress percentage, if this is a progress event.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Progress { percent } => Some(*percent),
            _ => None,
        }
    }
}
