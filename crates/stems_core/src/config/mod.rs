//! Configuration management for yt2stems.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults applied for any missing key
//!
//! # Example
//!
//! ```no_run
//! use stems_core::config::{ConfigManager, ConfigSection};
//! use stems_core::models::SeparationModel;
//!
//! let mut config = ConfigManager::new(".config/yt2stems.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Separator: {}", config.settings().tools.separator);
//!
//! config.settings_mut().defaults.model = SeparationModel::HtdemucsFt;
//! config.update_section(ConfigSection::Defaults).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AnalysisSettings, ConfigSection, JobDefaults, LoggingSettings, PathSettings, Settings,
    ToolSettings,
};
