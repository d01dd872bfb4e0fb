//! Pipeline step implementations.
//!
//! Progress milestones on the overall 0..=100 scale:
//!
//! | step      | range            |
//! |-----------|------------------|
//! | Acquire   | 0 → 10 (download scraped into 0..10) |
//! | Analyze   | stays at 10      |
//! | Transcode | jumps to 40      |
//! | Separate  | 40..90 scraped, then 90 |
//! | Relocate  | 100 when the job is done |

mod acquire;
mod analyze;
mod relocate;
mod separate;
mod transcode;

pub use acquire::AcquireStep;
pub use analyze::AnalyzeStep;
pub use relocate::RelocateStep;
pub use separate::SeparateStep;
pub use transcode::TranscodeStep;

use crate::process::ProgressWindow;

/// Downloader progress maps onto 0..10.
pub const DOWNLOAD_WINDOW: ProgressWindow = ProgressWindow { offset: 0, span: 10 };
pub const ACQUIRED_PROGRESS: u8 = 10;
pub const TRANSCODED_PROGRESS: u8 = 40;
/// Separator progress maps onto 40..90.
pub const SEPARATION_WINDOW: ProgressWindow = ProgressWindow { offset: 40, span: 50 };
pub const SEPARATED_PROGRESS: u8 = 90;
