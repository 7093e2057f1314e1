//! Core types for the narration pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{StepError, StepResult};
use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{NarrationResult, RenderedSegment, TextSegment};
use crate::tools::{MediaTool, Synthesizer};
use crate::workspace::Workspace;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Arc<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Holds everything a run needs that steps may read but not modify.
/// Results go in `JobState`. Shared across synthesis workers.
pub struct Context<'a> {
    /// Text being narrated.
    pub text: &'a str,
    /// Settings for this run.
    pub settings: &'a Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Workspace owned by this run.
    pub workspace: &'a Workspace,
    /// Final location of the assembled audio.
    pub destination: PathBuf,
    /// Speech synthesizer.
    pub synthesizer: &'a dyn Synthesizer,
    /// Media tool for silence, probing and concatenation.
    pub media: &'a dyn MediaTool,
    /// Per-run logger.
    pub logger: Arc<JobLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl<'a> Context<'a> {
    /// Create a new context for a run.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: &'a str,
        settings: &'a Settings,
        job_name: impl Into<String>,
        workspace: &'a Workspace,
        destination: PathBuf,
        synthesizer: &'a dyn Synthesizer,
        media: &'a dyn MediaTool,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            text,
            settings,
            job_name: job_name.into(),
            workspace,
            destination,
            synthesizer,
            media,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Record a failed tool's message in the log tail and show it.
    pub fn log_tool_failure(&self, tool: &str, error: &StepError) {
        for line in error.to_string().lines() {
            self.logger.output_line(line, true);
        }
        self.logger.show_tail(tool);
    }
}

/// Where a run is in its lifecycle.
///
/// Success path:
/// `Created → WorkspaceReady → GapReady → Split → Rendered → PlaylistReady
/// → Assembled → Finalized → CleanedUp`.
/// Any non-terminal stage may move to `Failed`, which is followed by
/// `CleanedUp` once the workspace has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Created,
    WorkspaceReady,
    GapReady,
    Split,
    Rendered,
    PlaylistReady,
    Assembled,
    Finalized,
    Failed,
    CleanedUp,
}

impl PipelineStage {
    /// The next stage on the success path.
    pub fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Created => Some(PipelineStage::WorkspaceReady),
            PipelineStage::WorkspaceReady => Some(PipelineStage::GapReady),
            PipelineStage::GapReady => Some(PipelineStage::Split),
            PipelineStage::Split => Some(PipelineStage::Rendered),
            PipelineStage::Rendered => Some(PipelineStage::PlaylistReady),
            PipelineStage::PlaylistReady => Some(PipelineStage::Assembled),
            PipelineStage::Assembled => Some(PipelineStage::Finalized),
            PipelineStage::Finalized => Some(PipelineStage::CleanedUp),
            PipelineStage::Failed => Some(PipelineStage::CleanedUp),
            PipelineStage::CleanedUp => None,
        }
    }

    /// Whether moving from this stage to `to` is allowed.
    pub fn can_transition_to(&self, to: PipelineStage) -> bool {
        match to {
            PipelineStage::Failed => !self.is_terminal(),
            _ => self.successor() == Some(to),
        }
    }

    /// `Failed` and `CleanedUp` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Failed | PipelineStage::CleanedUp)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Steps add their output to their own field and never rewrite an
/// earlier step's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Current lifecycle stage.
    pub stage: PipelineStage,
    /// Silence gap file (from Gap step; absent when the gap is disabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<PathBuf>,
    /// Sentences (from Split step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TextSegment>>,
    /// Synthesized sentences in input order (from Render step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<Vec<RenderedSegment>>,
    /// Concat playlist (from Playlist step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<PathBuf>,
    /// Concatenated audio inside the workspace (from Assemble step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembled: Option<PathBuf>,
    /// Reported result (from Finalize step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<NarrationResult>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Move to `to`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, to: PipelineStage) -> StepResult<()> {
        if !self.stage.can_transition_to(to) {
            return Err(StepError::precondition_failed(format!(
                "cannot move from {:?} to {:?}",
                self.stage, to
            )));
        }
        self.stage = to;
        Ok(())
    }

    /// Mark the run failed. No-op once the run has ended.
    pub fn mark_failed(&mut self) {
        if !self.stage.is_terminal() {
            self.stage = PipelineStage::Failed;
        }
    }

    /// Sentences from the Split step.
    pub fn segments(&self) -> StepResult<&[TextSegment]> {
        self.segments
            .as_deref()
            .ok_or_else(|| StepError::precondition_failed("text has not been split"))
    }

    /// Rendered sentences from the Render step.
    pub fn rendered(&self) -> StepResult<&[RenderedSegment]> {
        self.rendered
            .as_deref()
            .ok_or_else(|| StepError::precondition_failed("segments have not been rendered"))
    }

    /// Playlist from the Playlist step.
    pub fn playlist(&self) -> StepResult<&Path> {
        self.playlist
            .as_deref()
            .ok_or_else(|| StepError::precondition_failed("playlist has not been written"))
    }

    /// Assembled file from the Assemble step.
    pub fn assembled(&self) -> StepResult<&Path> {
        self.assembled
            .as_deref()
            .ok_or_else(|| StepError::precondition_failed("audio has not been assembled"))
    }
}

/// Outcome of a step's `execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step had nothing to do (not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_path_is_linear() {
        let mut state = JobState::new("job");
        let path = [
            PipelineStage::WorkspaceReady,
            PipelineStage::GapReady,
            PipelineStage::Split,
            PipelineStage::Rendered,
            PipelineStage::PlaylistReady,
            PipelineStage::Assembled,
            PipelineStage::Finalized,
            PipelineStage::CleanedUp,
        ];
        for stage in path {
            state.transition(stage).unwrap();
        }
        assert_eq!(state.stage, PipelineStage::CleanedUp);
    }

    #[test]
    fn stages_cannot_be_skipped() {
        let mut state = JobState::new("job");
        state.transition(PipelineStage::WorkspaceReady).unwrap();

        let err = state.transition(PipelineStage::Rendered).unwrap_err();
        assert!(matches!(err, StepError::PreconditionFailed(_)));
        assert_eq!(state.stage, PipelineStage::WorkspaceReady);
    }

    #[test]
    fn failure_leads_only_to_cleanup() {
        let mut state = JobState::new("job");
        state.transition(PipelineStage::WorkspaceReady).unwrap();
        state.mark_failed();

        assert!(state.transition(PipelineStage::GapReady).is_err());
        state.transition(PipelineStage::CleanedUp).unwrap();

        // Already ended
        state.mark_failed();
        assert_eq!(state.stage, PipelineStage::CleanedUp);
    }

    #[test]
    fn missing_outputs_are_precondition_errors() {
        let state = JobState::new("job");
        assert!(state.segments().is_err());
        assert!(state.rendered().is_err());
        assert!(state.playlist().is_err());
        assert!(state.assembled().is_err());
        assert!(state.started_at.is_some());
    }
}
