//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::models::{Bitrate, SeparationModel, StemFormat};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Job defaults used when the front end does not override them.
    #[serde(default)]
    pub defaults: JobDefaults,

    /// Tempo/key analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for output, temp, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for stems and MP3s.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-job scratch directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    ".".to_string()
}

fn default_temp_root() -> String {
    std::env::temp_dir()
        .join("yt2stems")
        .to_string_lossy()
        .to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// External tool programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Downloader executable (yt-dlp compatible).
    #[serde(default = "default_downloader")]
    pub downloader: String,

    /// Transcoder/decoder executable (ffmpeg compatible).
    #[serde(default = "default_transcoder")]
    pub transcoder: String,

    /// Separation tool executable.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Arguments placed before the input path, e.g. `["-m", "demucs"]`
    /// when `separator` is a Python interpreter.
    #[serde(default)]
    pub separator_args: Vec<String>,
}

fn default_downloader() -> String {
    "yt-dlp".to_string()
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

fn default_separator() -> String {
    "demucs".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            transcoder: default_transcoder(),
            separator: default_separator(),
            separator_args: Vec::new(),
        }
    }
}

/// Default job parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDefaults {
    #[serde(default)]
    pub bitrate: Bitrate,

    #[serde(default)]
    pub model: SeparationModel,

    #[serde(default)]
    pub two_stems: bool,

    #[serde(default)]
    pub stem_format: StemFormat,
}

/// Tempo/key analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Run the analysis stage at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// External analyzer command. Empty uses the built-in analyzer.
    #[serde(default)]
    pub command: String,

    /// Extra arguments for the analyzer.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: String::new(),
            args: Vec::new(),
        }
    }
}

impl AnalysisSettings {
    /// The external analyzer to run instead of the built-in one.
    pub fn external_command(&self) -> Option<&str> {
        let command = self.command.trim();
        (!command.is_empty()).then_some(command)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Throttle progress lines in job log files.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines kept for the failure tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress step percentage for compact mode.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Timestamp log lines.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Tools,
    Defaults,
    Analysis,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Tools,
        ConfigSection::Defaults,
        ConfigSection::Analysis,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Defaults => "defaults",
            ConfigSection::Analysis => "analysis",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section in a fresh config file.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Output, scratch and log directories",
            ConfigSection::Tools => "# External tools (executables on PATH or absolute paths)",
            ConfigSection::Defaults => "# Job defaults",
            ConfigSection::Analysis => "# Tempo/key analyzer (leave command empty for the built-in one)",
            ConfigSection::Logging => "# Logging configuration",
        }
    }
}
