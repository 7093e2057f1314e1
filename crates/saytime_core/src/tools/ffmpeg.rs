//! ffmpeg / ffprobe adapters.
//!
//! Covers the three media operations the pipeline needs: generating the
//! silence gap, probing a file's duration, and concatenating a playlist
//! without re-encoding.

use std::ffi::OsStr;
use std::path::Path;

use super::command::{run_tool, ToolError, ToolResult};
use crate::config::{GapSettings, ToolSettings};
use crate::models::AudioFormat;

/// Media operations used by the pipeline.
pub trait MediaTool: Send + Sync {
    /// Write `duration_secs` of silence in `format` to `output_path`.
    fn generate_silence(
        &self,
        output_path: &Path,
        duration_secs: f64,
        format: &AudioFormat,
    ) -> ToolResult<()>;

    /// Duration of a media file in seconds.
    fn probe_duration(&self, input_path: &Path) -> ToolResult<f64>;

    /// Join the files listed in a concat playlist into `output_path`, stream copied.
    fn concat(&self, playlist_path: &Path, output_path: &Path) -> ToolResult<()>;
}

/// [`MediaTool`] backed by the ffmpeg and ffprobe executables.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg: String,
    ffprobe: String,
    channel_layout: String,
}

impl FfmpegTool {
    pub fn new() -> Self {
        Self::from_settings(&ToolSettings::default(), &GapSettings::default())
    }

    /// Build from the `[tools]` and `[gap]` settings sections.
    pub fn from_settings(tools: &ToolSettings, gap: &GapSettings) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
            channel_layout: gap.channel_layout.clone(),
        }
    }

    fn silence_args(
        &self,
        output_path: &Path,
        duration_secs: f64,
        format: &AudioFormat,
    ) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!(
                "anullsrc=channel_layout={}:sample_rate={}",
                self.channel_layout, format.sample_rate
            ),
            "-t".to_string(),
            format!("{}", duration_secs),
            "-c:a".to_string(),
            format.codec.clone(),
            output_path.display().to_string(),
        ]
    }

    fn concat_args(&self, playlist_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            // Playlist entries are absolute workspace paths
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            playlist_path.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output_path.display().to_string(),
        ]
    }
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTool for FfmpegTool {
    fn generate_silence(
        &self,
        output_path: &Path,
        duration_secs: f64,
        format: &AudioFormat,
    ) -> ToolResult<()> {
        run_tool(
            &self.ffmpeg,
            self.silence_args(output_path, duration_secs, format),
        )?;
        Ok(())
    }

    fn probe_duration(&self, input_path: &Path) -> ToolResult<f64> {
        let args: [&OsStr; 8] = [
            OsStr::new("-i"),
            input_path.as_os_str(),
            OsStr::new("-show_entries"),
            OsStr::new("format=duration"),
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-of"),
            OsStr::new("csv=p=0"),
        ];
        let output = run_tool(&self.ffprobe, args)?;

        parse_duration(&String::from_utf8_lossy(&output.stdout))
            .map_err(|message| ToolError::invalid_output(&self.ffprobe, message))
    }

    fn concat(&self, playlist_path: &Path, output_path: &Path) -> ToolResult<()> {
        run_tool(&self.ffmpeg, self.concat_args(playlist_path, output_path))?;
        Ok(())
    }
}

/// Parse ffprobe's `csv=p=0` duration output.
fn parse_duration(stdout: &str) -> Result<f64, String> {
    let trimmed = stdout.trim();
    let duration: f64 = trimmed
        .parse()
        .map_err(|e| format!("failed to parse duration '{}': {}", trimmed, e))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(format!("invalid duration '{}'", trimmed));
    }
    Ok(duration)
}
