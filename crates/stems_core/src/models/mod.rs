//! Data models for yt2stems.
//!
//! This module contains the core data structures shared by the pipeline
//! and its front ends:
//! - Enums for bitrates, separation models, stem formats and stages
//! - The immutable job description
//! - The event stream delivered to the presentation layer

mod enums;
mod events;
mod job;

pub use enums::{Bitrate, SeparationModel, Stage, StemFormat};
pub use events::ProgressEvent;
pub use job::{has_supported_extension, Job, JobSource, SUPPORTED_EXTENSIONS};
