//! Playlist step - writes the concat list for the assembler.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};
use crate::playlist::write_playlist;

/// Writes one entry per rendered sentence, each followed by the gap.
pub struct PlaylistStep;

impl PlaylistStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaylistStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlaylistStep {
    fn name(&self) -> &str {
        "Playlist"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::PlaylistReady
    }

    fn description(&self) -> &str {
        "Write concat playlist"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let path = ctx.workspace.playlist_path();
        let rendered = state.rendered()?;

        write_playlist(&path, rendered, state.gap.as_deref())?;
        ctx.logger.debug(&format!(
            "Wrote {} entries to {}",
            rendered.len(),
            path.display()
        ));

        state.playlist = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let path = state.playlist()?;
        if !path.is_file() {
            return Err(StepError::invalid_output(format!(
                "playlist {} does not exist",
                path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderedSegment;
    use crate::orchestrator::test_support::Harness;
    use std::fs;

    fn rendered_state(harness: &Harness, count: usize) -> JobState {
        let mut state = JobState::new("job");
        state.rendered = Some(
            (0..count)
                .map(|i| RenderedSegment {
                    index: i,
                    file_path: harness.workspace.segment_path(i),
                    duration: 1.0,
                    text: format!("Sentence {}.", i),
                })
                .collect(),
        );
        state
    }

    #[test]
    fn lists_each_segment_followed_by_gap() {
        let harness = Harness::new();
        let ctx = harness.context("");
        let mut state = rendered_state(&harness, 2);
        state.gap = Some(harness.workspace.gap_path().to_path_buf());

        let step = PlaylistStep::new();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let content = fs::read_to_string(state.playlist().unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("0.wav'"));
        assert!(lines[1].ends_with("gap.wav'"));
        assert!(lines[2].ends_with("1.wav'"));
        assert!(lines[3].ends_with("gap.wav'"));
    }

    #[test]
    fn no_gap_lines_without_gap() {
        let harness = Harness::new();
        let ctx = harness.context("");
        let mut state = rendered_state(&harness, 3);

        PlaylistStep::new().execute(&ctx, &mut state).unwrap();

        let content = fs::read_to_string(state.playlist().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(!content.contains("gap.wav"));
    }
}
