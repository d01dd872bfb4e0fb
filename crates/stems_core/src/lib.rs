//! Stems Core - Backend logic for yt2stems
//!
//! This crate contains the whole download, transcode and stem-separation
//! pipeline with zero UI dependencies. The `yt2stems` binary is a thin
//! front end over [`orchestrator::StemWorker`].

pub mod acquire;
pub mod analysis;
pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod process;
pub mod relocate;
pub mod scratch;
pub mod separation;
pub mod transcode;

pub use config::{ConfigManager, Settings};
pub use models::{Bitrate, Job, ProgressEvent, SeparationModel, Stage, StemFormat};
pub use orchestrator::{JobOutcome, StemWorker, WorkerHandle};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
