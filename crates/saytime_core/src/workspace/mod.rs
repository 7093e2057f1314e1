//! Per-run workspace directory.
//!
//! Every narration run gets its own uniquely named directory holding the
//! silence gap, per-segment audio, the playlist and the assembled file.
//! The directory is removed exactly once by [`Workspace::destroy`]; if a
//! `Workspace` is dropped without being destroyed (for example while
//! unwinding) it is still removed, best effort.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::models::AudioFormat;
use crate::orchestrator::{StepError, StepResult};
use crate::tools::MediaTool;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "saytime-";

const GAP_FILE: &str = "gap.wav";
const PLAYLIST_FILE: &str = "list.txt";
const ASSEMBLED_FILE: &str = "assembled.wav";

/// An ephemeral directory owned by one narration run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    gap_path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named workspace under `parent`.
    ///
    /// `parent` is created if it does not exist.
    pub fn create(parent: &Path) -> StepResult<Self> {
        let creation_error = |source| StepError::WorkspaceCreation {
            path: parent.to_path_buf(),
            source,
        };

        fs::create_dir_all(parent).map_err(creation_error)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(creation_error)?;

        let gap_path = dir.path().join(GAP_FILE);
        tracing::debug!("Created workspace {}", dir.path().display());

        Ok(Self { dir, gap_path })
    }

    /// Root directory of the workspace.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Where the shared silence gap lives.
    pub fn gap_path(&self) -> &Path {
        &self.gap_path
    }

    /// Audio file for the segment at `index`.
    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.root().join(format!("{}.wav", index))
    }

    /// Concat playlist file.
    pub fn playlist_path(&self) -> PathBuf {
        self.root().join(PLAYLIST_FILE)
    }

    /// Concatenated output before it is moved to its destination.
    pub fn assembled_path(&self) -> PathBuf {
        self.root().join(ASSEMBLED_FILE)
    }

    /// Generate the silence gap inserted after each segment.
    pub fn generate_gap(
        &self,
        media: &dyn MediaTool,
        duration_secs: f64,
        format: &AudioFormat,
    ) -> StepResult<&Path> {
        media
            .generate_silence(&self.gap_path, duration_secs, format)
            .map_err(|e| StepError::SilenceGeneration {
                exit_code: e.exit_code(),
                message: e.detail(),
            })?;

        if !self.gap_path.exists() {
            return Err(StepError::invalid_output(format!(
                "silence file {} was not created",
                self.gap_path.display()
            )));
        }

        Ok(&self.gap_path)
    }

    /// Recursively remove the workspace.
    pub fn destroy(self) -> StepResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| StepError::Cleanup {
                path: path.clone(),
                source,
            })?;
        tracing::debug!("Removed workspace {}", path.display());
        Ok(())
    }
}
