//! yt2stems - Main entry point
//!
//! Thin command-line front end over the core pipeline. It handles:
//! - Application-level logging initialization
//! - Configuration loading and CLI overrides
//! - Spawning the job worker and rendering its event stream

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;

use stems_core::config::{ConfigManager, ConfigSection};
use stems_core::logging::{init_tracing, LogLevel};
use stems_core::models::{Bitrate, Job, ProgressEvent, SeparationModel, StemFormat};
use stems_core::orchestrator::StemWorker;

/// Download or load audio, transcode to MP3 and split it into stems.
#[derive(Debug, Parser)]
#[command(name = "yt2stems", version, about)]
struct Args {
    /// Remote URL or local audio file
    source: String,

    /// MP3 bitrate in kbps (96, 128, 192, 320)
    #[arg(short, long)]
    bitrate: Option<Bitrate>,

    /// Separation model (htdemucs, htdemucs_ft, htdemucs_6s, mdx, mdx_extra_q)
    #[arg(short, long)]
    model: Option<SeparationModel>,

    /// Split into vocals and accompaniment only
    #[arg(long, conflicts_with = "full_stems")]
    two_stems: bool,

    /// Split into every stem of the model, overriding a saved two-stem default
    #[arg(long)]
    full_stems: bool,

    /// Stem encoding (wav16, wav24, wav_float, flac, mp3)
    #[arg(short = 'f', long = "format")]
    stem_format: Option<StemFormat>,

    /// Output folder (defaults to paths.output_folder from the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file
    #[arg(long, env = "YT2STEMS_CONFIG", default_value = ".config/yt2stems.toml")]
    config: PathBuf,

    /// Print every event as one JSON line
    #[arg(long)]
    json: bool,

    /// Persist the chosen bitrate/model/two-stem/format as new defaults
    #[arg(long)]
    save_defaults: bool,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: LogLevel,
}

impl Args {
    /// Two-stem choice from the flags, `None` keeps the configured default.
    fn two_stems_override(&self) -> Option<bool> {
        match (self.two_stems, self.full_stems) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let mut config = ConfigManager::new(&args.config);
    if let Err(e) = config.load_or_create() {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
    }
    tracing::info!("Config: {}", args.config.display());
    tracing::info!("Core version: {}", stems_core::version());

    {
        let defaults = &mut config.settings_mut().defaults;
        if let Some(bitrate) = args.bitrate {
            defaults.bitrate = bitrate;
        }
        if let Some(model) = args.model {
            defaults.model = model;
        }
        if let Some(two_stems) = args.two_stems_override() {
            defaults.two_stems = two_stems;
        }
        if let Some(format) = args.stem_format {
            defaults.stem_format = format;
        }
    }
    if args.save_defaults {
        config
            .update_section(ConfigSection::Defaults)
            .with_context(|| format!("saving defaults to {}", args.config.display()))?;
    }

    let settings = config.settings().clone();
    let output_dir = args
        .output
        .unwrap_or_else(|| PathBuf::from(&settings.paths.output_folder));
    let defaults = &settings.defaults;
    let job = Job::new(args.source, output_dir)
        .with_bitrate(defaults.bitrate)
        .with_model(defaults.model)
        .with_two_stems(defaults.two_stems)
        .with_stem_format(defaults.stem_format);

    let handle = StemWorker::new(job, settings).spawn();
    let mut renderer = Renderer::new(args.json);
    for event in handle.events().iter() {
        renderer.render(&event)?;
        if event.is_terminal() {
            break;
        }
    }

    let outcome = handle.join();
    if let Some(ref log_path) = outcome.log_path {
        tracing::info!("Job log: {}", log_path.display());
    }
    Ok(outcome.success)
}

/// Writes events to stdout, either as text or JSON lines.
struct Renderer {
    json: bool,
    out: io::Stdout,
    last_percent: Option<u8>,
}

impl Renderer {
    fn new(json: bool) -> Self {
        Self {
            json,
            out: io::stdout(),
            last_percent: None,
        }
    }

    fn render(&mut self, event: &ProgressEvent) -> Result<()> {
        let mut out = self.out.lock();
        if self.json {
            serde_json::to_writer(&mut out, event)?;
            writeln!(out)?;
            return Ok(());
        }

        match event {
            ProgressEvent::Log { message } => {
                if self.last_percent.is_some() {
                    writeln!(out)?;
                    self.last_percent = None;
                }
                writeln!(out, "{}", message)?;
            }
            ProgressEvent::Progress { percent } => {
                write!(out, "\r{}", progress_bar(*percent))?;
                self.last_percent = Some(*percent);
            }
            ProgressEvent::Done { success, message } => {
                if self.last_percent.is_some() {
                    writeln!(out)?;
                }
                let tag = if *success { "OK" } else { "FAILED" };
                writeln!(out, "[{}] {}", tag, message)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Fixed-width bar like `[##########----------]  50%`.
fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0), "[--------------------]   0%");
        assert_eq!(progress_bar(50), "[##########----------]  50%");
        assert_eq!(progress_bar(100), "[####################] 100%");
    }

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "yt2stems",
            "song.wav",
            "-b",
            "192",
            "-m",
            "htdemucs_6s",
            "--two-stems",
            "-f",
            "flac",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.bitrate, Some(Bitrate::Kbps192));
        assert_eq!(args.model, Some(SeparationModel::Htdemucs6s));
        assert_eq!(args.two_stems_override(), Some(true));
        assert_eq!(args.stem_format, Some(StemFormat::Flac));
        assert!(args.json);
        assert_eq!(args.log_level, LogLevel::Warn);
    }

    #[test]
    fn full_stems_turns_two_stem_mode_off() {
        let args = Args::try_parse_from(["yt2stems", "song.wav", "--full-stems"]).unwrap();
        assert_eq!(args.two_stems_override(), Some(false));

        let args = Args::try_parse_from(["yt2stems", "song.wav"]).unwrap();
        assert_eq!(args.two_stems_override(), None);

        assert!(Args::try_parse_from(["yt2stems", "song.wav", "--two-stems", "--full-stems"]).is_err());
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(Args::try_parse_from(["yt2stems", "song.wav", "-m", "nope"]).is_err());
    }
}
