//! External tool adapters.
//!
//! The pipeline never spawns processes directly; it talks to two traits:
//! - [`Synthesizer`] turns one sentence into an audio file
//! - [`MediaTool`] generates silence, probes durations and concatenates
//!
//! Command-backed implementations wrap `say` / `espeak-ng` and
//! `ffmpeg` / `ffprobe`. Tests substitute in-process fakes.

mod command;
mod ffmpeg;
mod synthesizer;

pub use command::{run_tool, ToolError, ToolResult};
pub use ffmpeg::{FfmpegTool, MediaTool};
pub use synthesizer::{CommandSynthesizer, Synthesizer};
