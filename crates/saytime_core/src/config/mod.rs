//! Configuration management for saytime.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for every missing key
//!
//! # Example
//!
//! ```no_run
//! use saytime_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/saytime.toml");
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().synthesis.concurrency = 4;
//! config.update_section(ConfigSection::Synthesis).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, GapSettings, LoggingSettings, PathSettings, Settings, SynthesisEngine,
    SynthesisSettings, TextSettings, ToolSettings,
};
