//! Assemble step - concatenates the playlist into one file.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};

/// Joins the playlist entries with the media tool, without re-encoding.
pub struct AssembleStep;

impl AssembleStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssembleStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleStep {
    fn name(&self) -> &str {
        "Assemble"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Assembled
    }

    fn description(&self) -> &str {
        "Concatenate audio"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let playlist = state.playlist()?;
        let output = ctx.workspace.assembled_path();

        ctx.media
            .concat(playlist, &output)
            .map_err(|e| StepError::Assembly {
                exit_code: e.exit_code(),
                message: e.detail(),
            })
            .inspect_err(|e| ctx.log_tool_failure("concat", e))?;

        state.assembled = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let path = state.assembled()?;
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(StepError::invalid_output(format!(
                "assembled file {} is missing or empty",
                path.display()
            )));
        }
        Ok(())
    }
}
