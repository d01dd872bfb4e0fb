//! External command execution with live progress scraping.
//!
//! Every external tool the pipeline drives (downloader, transcoder,
//! separator) goes through a [`CommandRunner`]. The runner streams the
//! tool's diagnostic output line by line, forwards each line to a
//! [`RunObserver`], scrapes percentage markers and maps them into a
//! [`ProgressWindow`] of the overall job scale.

mod errors;
mod lines;
mod progress;
mod runner;

pub use errors::{ProcessError, ProcessResult};
pub use lines::OutputLines;
pub use progress::{scrape_percent, ProgressWindow};
pub use runner::{CommandRunner, CommandSpec, OutputStream, RunObserver, SystemRunner};
