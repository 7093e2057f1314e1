//! Split step - breaks the input text into sentences.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};
use crate::text::{split_text, SplitOptions};

/// Splits `ctx.text` into indexed sentences.
pub struct SplitStep;

impl SplitStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SplitStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SplitStep {
    fn name(&self) -> &str {
        "Split"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Split
    }

    fn description(&self) -> &str {
        "Split text into sentences"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let options = SplitOptions {
            keep_trailing_fragment: ctx.settings.text.keep_trailing_fragment,
        };
        let segments = split_text(ctx.text, options);

        ctx.logger
            .info(&format!("Found {} sentence(s)", segments.len()));
        for segment in &segments {
            ctx.logger
                .debug(&format!("[{}] {}", segment.index, segment.text));
        }

        state.segments = Some(segments);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.segments()?.is_empty() {
            return Err(StepError::invalid_output(
                "no sentences found in input text",
            ));
        }
        Ok(())
    }
}
