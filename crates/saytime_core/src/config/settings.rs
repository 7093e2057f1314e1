//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::AudioFormat;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Speech synthesis settings.
    #[serde(default)]
    pub synthesis: SynthesisSettings,

    /// Silence inserted between sentences.
    #[serde(default)]
    pub gap: GapSettings,

    /// External media tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Text splitting settings.
    #[serde(default)]
    pub text: TextSettings,
}

impl Settings {
    /// Format of the silence gap.
    ///
    /// Follows the synthesizer's output unless `[gap]` sets codec or sample
    /// rate explicitly. `None` when neither gives a complete format.
    pub fn gap_format(&self) -> Option<AudioFormat> {
        let output = self.synthesis.output_format();
        let codec = self
            .gap
            .codec
            .clone()
            .or_else(|| output.as_ref().map(|f| f.codec.clone()))?;
        let sample_rate = self
            .gap
            .sample_rate
            .or_else(|| output.as_ref().map(|f| f.sample_rate))?;
        Some(AudioFormat::new(codec, sample_rate))
    }
}

/// Path configuration for workspaces and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Parent folder for per-run workspaces. Empty means the system temp dir.
    #[serde(default)]
    pub temp_root: String,

    /// Folder for per-run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Write a log file per run into `logs_folder`.
    #[serde(default)]
    pub write_job_logs: bool,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: String::new(),
            logs_folder: default_logs_folder(),
            write_job_logs: false,
        }
    }
}

impl PathSettings {
    /// Resolve the workspace parent directory.
    pub fn temp_root_dir(&self) -> PathBuf {
        if self.temp_root.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.temp_root)
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for per-run log output.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format (tool output only kept in the tail buffer).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show when a tool fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix log lines with a timestamp.
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
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Build the per-run logger configuration.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            progress_step: self.progress_step.max(1),
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Which speech synthesis command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisEngine {
    /// macOS `say`.
    #[default]
    Say,
    /// `espeak-ng`.
    EspeakNg,
}

impl SynthesisEngine {
    /// WAV format `espeak-ng -w` writes.
    pub const ESPEAK_OUTPUT_CODEC: &'static str = "pcm_s16le";
    pub const ESPEAK_OUTPUT_RATE: u32 = 22050;

    /// Executable name looked up in PATH when no program is configured.
    pub fn default_program(&self) -> &'static str {
        match self {
            SynthesisEngine::Say => "say",
            SynthesisEngine::EspeakNg => "espeak-ng",
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Synthesis engine.
    #[serde(default)]
    pub engine: SynthesisEngine,

    /// Path to the synthesis executable. Empty means the engine's default.
    #[serde(default)]
    pub program: String,

    /// Output sample format passed to `say --data-format`.
    #[serde(default = "default_data_format")]
    pub data_format: String,

    /// Maximum number of synthesis processes running at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_data_format() -> String {
    "LEF32@16000".to_string()
}

fn default_concurrency() -> usize {
    10
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            engine: SynthesisEngine::default(),
            program: String::new(),
            data_format: default_data_format(),
            concurrency: default_concurrency(),
        }
    }
}

impl SynthesisSettings {
    /// Executable to run for synthesis.
    pub fn program(&self) -> &str {
        if self.program.trim().is_empty() {
            self.engine.default_program()
        } else {
            &self.program
        }
    }

    /// Format of the files the engine writes.
    ///
    /// For `say` this follows `data_format`; `espeak-ng` always writes
    /// 16-bit PCM at 22050 Hz.
    pub fn output_format(&self) -> Option<AudioFormat> {
        match self.engine {
            SynthesisEngine::Say => AudioFormat::from_say_data_format(&self.data_format),
            SynthesisEngine::EspeakNg => Some(AudioFormat::new(
                SynthesisEngine::ESPEAK_OUTPUT_CODEC,
                SynthesisEngine::ESPEAK_OUTPUT_RATE,
            )),
        }
    }

    /// Concurrency limit, never below one.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// Silence gap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapSettings {
    /// Gap length in seconds.
    #[serde(default = "default_gap_duration")]
    pub duration_secs: f64,

    /// Gap sample rate. Unset follows the synthesizer output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Gap channel layout; must match the synthesizer output.
    #[serde(default = "default_channel_layout")]
    pub channel_layout: String,

    /// Gap PCM codec. Unset follows the synthesizer output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

fn default_gap_duration() -> f64 {
    0.5
}

fn default_channel_layout() -> String {
    "mono".to_string()
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_gap_duration(),
            sample_rate: None,
            channel_layout: default_channel_layout(),
            codec: None,
        }
    }
}

/// External media tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

/// Text splitting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextSettings {
    /// Keep text after the last sentence terminator as a final sentence.
    #[serde(default)]
    pub keep_trailing_fragment: bool,
}

/// Config sections for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Synthesis,
    Gap,
    Tools,
    Text,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 6] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Synthesis,
        ConfigSection::Gap,
        ConfigSection::Tools,
        ConfigSection::Text,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Synthesis => "synthesis",
            ConfigSection::Gap => "gap",
            ConfigSection::Tools => "tools",
            ConfigSection::Text => "text",
        }
    }

    /// Comment written above the section in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Workspace and log directories",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Synthesis => "# Speech synthesis",
            ConfigSection::Gap => "# Silence inserted after each sentence",
            ConfigSection::Tools => "# ffmpeg / ffprobe locations",
            ConfigSection::Text => "# Sentence splitting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[synthesis]"));
        assert!(toml.contains("concurrency = 10"));
        assert!(toml.contains("engine = \"say\""));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[synthesis]\nengine = \"espeak_ng\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();

        assert_eq!(parsed.synthesis.engine, SynthesisEngine::EspeakNg);
        assert_eq!(parsed.synthesis.program(), "espeak-ng");
        assert_eq!(parsed.synthesis.concurrency, 10);
        assert_eq!(parsed.gap.duration_secs, 0.5);
        assert_eq!(parsed.gap.sample_rate, None);
        assert_eq!(parsed.tools.ffmpeg, "ffmpeg");
        assert!(!parsed.text.keep_trailing_fragment);
    }

    #[test]
    fn gap_follows_say_data_format() {
        let mut settings = Settings::default();
        assert_eq!(settings.gap_format(), Some(AudioFormat::new("pcm_f32le", 16000)));

        settings.synthesis.data_format = "LEI16@22050".to_string();
        assert_eq!(settings.gap_format(), Some(AudioFormat::new("pcm_s16le", 22050)));
    }

    #[test]
    fn gap_follows_espeak_output() {
        let minimal = "[synthesis]\nengine = \"espeak_ng\"";
        let settings: Settings = toml::from_str(minimal).unwrap();

        assert_eq!(settings.gap_format(), Some(AudioFormat::new("pcm_s16le", 22050)));
    }

    #[test]
    fn explicit_gap_format_wins() {
        let mut settings = Settings::default();
        settings.synthesis.engine = SynthesisEngine::EspeakNg;
        settings.gap.sample_rate = Some(48000);
        assert_eq!(settings.gap_format(), Some(AudioFormat::new("pcm_s16le", 48000)));

        settings.synthesis.engine = SynthesisEngine::Say;
        settings.synthesis.data_format = "LEF32".to_string();
        settings.gap.sample_rate = None;
        assert_eq!(settings.gap_format(), None);

        // Rate alone is not enough without a codec
        settings.gap.sample_rate = Some(16000);
        assert_eq!(settings.gap_format(), None);

        settings.gap.codec = Some("pcm_f32le".to_string());
        assert_eq!(settings.gap_format(), Some(AudioFormat::new("pcm_f32le", 16000)));
    }

    #[test]
    fn concurrency_limit_is_at_least_one() {
        let settings = SynthesisSettings {
            concurrency: 0,
            ..Default::default()
        };
        assert_eq!(settings.concurrency_limit(), 1);
    }

    #[test]
    fn empty_temp_root_uses_system_temp() {
        assert_eq!(PathSettings::default().temp_root_dir(), std::env::temp_dir());
        let custom = PathSettings {
            temp_root: "/var/tmp/saytime".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.temp_root_dir(), PathBuf::from("/var/tmp/saytime"));
    }
}
