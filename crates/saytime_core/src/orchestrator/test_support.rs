//! In-process stand-ins for the external tools, shared by pipeline tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::types::Context;
use crate::config::Settings;
use crate::logging::{JobLogger, LogConfig};
use crate::models::AudioFormat;
use crate::tools::{MediaTool, Synthesizer, ToolError, ToolResult};
use crate::workspace::Workspace;

/// Bytes per second of fake audio.
pub(crate) const FAKE_RATE: f64 = 100.0;

/// Writes the sentence text as its "audio".
#[derive(Default)]
pub(crate) struct FakeSynth {
    pub fail_on: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeSynth {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Default::default()
        }
    }
}

impl Synthesizer for FakeSynth {
    fn name(&self) -> &str {
        "fake-say"
    }

    fn synthesize(&self, text: &str, output_path: &Path) -> ToolResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref() == Some(text) {
            return Err(ToolError::Failed {
                tool: "fake-say".to_string(),
                exit_code: 1,
                stderr: format!("cannot say '{}'", text),
            });
        }
        fs::write(output_path, text.as_bytes()).map_err(|source| ToolError::Spawn {
            tool: "fake-say".to_string(),
            source,
        })
    }
}

/// Silence is `~` bytes, duration is file size, concat joins listed files.
#[derive(Default)]
pub(crate) struct FakeMedia {
    pub fail_silence: bool,
    pub fail_concat: bool,
    pub silence_format: Mutex<Option<AudioFormat>>,
}

impl MediaTool for FakeMedia {
    fn generate_silence(
        &self,
        output_path: &Path,
        duration_secs: f64,
        format: &AudioFormat,
    ) -> ToolResult<()> {
        *self.silence_format.lock() = Some(format.clone());
        if self.fail_silence {
            return Err(ToolError::Failed {
                tool: "fake-ffmpeg".to_string(),
                exit_code: 8,
                stderr: "anullsrc: unknown layout".to_string(),
            });
        }
        let bytes = vec![b'~'; (duration_secs * FAKE_RATE) as usize];
        fs::write(output_path, bytes).map_err(|source| ToolError::Spawn {
            tool: "fake-ffmpeg".to_string(),
            source,
        })
    }

    fn probe_duration(&self, input_path: &Path) -> ToolResult<f64> {
        let meta = fs::metadata(input_path).map_err(|source| ToolError::Spawn {
            tool: "fake-ffprobe".to_string(),
            source,
        })?;
        Ok(meta.len() as f64 / FAKE_RATE)
    }

    fn concat(&self, playlist_path: &Path, output_path: &Path) -> ToolResult<()> {
        if self.fail_concat {
            return Err(ToolError::Failed {
                tool: "fake-ffmpeg".to_string(),
                exit_code: 1,
                stderr: "list.txt: Invalid data found when processing input".to_string(),
            });
        }
        let io_err = |source: std::io::Error| ToolError::Spawn {
            tool: "fake-ffmpeg".to_string(),
            source,
        };
        let playlist = fs::read_to_string(playlist_path).map_err(io_err)?;
        let mut joined = Vec::new();
        for line in playlist.lines() {
            let quoted = line
                .strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .ok_or_else(|| ToolError::invalid_output("fake-ffmpeg", line))?;
            let path = quoted.replace("'\\''", "'");
            joined.extend(fs::read(path).map_err(io_err)?);
        }
        fs::write(output_path, joined).map_err(io_err)
    }
}

/// A workspace plus fakes, enough to build a [`Context`].
pub(crate) struct Harness {
    pub root: TempDir,
    pub settings: Settings,
    pub workspace: Workspace,
    pub synth: FakeSynth,
    pub media: FakeMedia,
    pub logger: Arc<JobLogger>,
}

impl Harness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(root.path()).unwrap();
        Self {
            root,
            settings: Settings::default(),
            workspace,
            synth: FakeSynth::default(),
            media: FakeMedia::default(),
            logger: Arc::new(JobLogger::detached("test", LogConfig::default())),
        }
    }

    pub fn destination(&self) -> PathBuf {
        self.root.path().join("out.wav")
    }

    pub fn context<'a>(&'a self, text: &'a str) -> Context<'a> {
        Context::new(
            text,
            &self.settings,
            "test",
            &self.workspace,
            self.destination(),
            &self.synth,
            &self.media,
            Arc::clone(&self.logger),
        )
    }
}
