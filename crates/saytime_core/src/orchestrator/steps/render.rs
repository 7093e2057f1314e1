//! Render step - synthesizes every sentence and measures its length.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};
use crate::render::RenderPool;

/// Runs the synthesis pool over the split sentences.
pub struct RenderStep;

impl RenderStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RenderStep {
    fn name(&self) -> &str {
        "Render"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Rendered
    }

    fn description(&self) -> &str {
        "Synthesize sentences"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let segments = state.segments()?;
        let total = segments.len();
        let pool = RenderPool::new(ctx.synthesizer, ctx.media)
            .with_limit(ctx.settings.synthesis.concurrency_limit());

        ctx.logger.info(&format!(
            "Synthesizing {} sentence(s) with {} (up to {} at once)",
            total,
            ctx.synthesizer.name(),
            pool.limit()
        ));

        let rendered = pool
            .render(
                segments,
                |index| ctx.workspace.segment_path(index),
                |segment, done| {
                    ctx.logger.debug(&format!(
                        "Rendered [{}] in {:.3}s",
                        segment.index, segment.duration
                    ));
                    let percent = (done * 100 / total) as u32;
                    ctx.logger.progress(percent);
                    ctx.report_progress(
                        self.name(),
                        percent,
                        &format!("{}/{} sentences", done, total),
                    );
                },
            )
            .inspect_err(|e| ctx.log_tool_failure("synthesis", e))?;

        state.rendered = Some(rendered);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let segments = state.segments()?;
        let rendered = state.rendered()?;
        if rendered.len() != segments.len() {
            return Err(StepError::invalid_output(format!(
                "rendered {} of {} sentences",
                rendered.len(),
                segments.len()
            )));
        }
        let in_order = segments
            .iter()
            .zip(rendered)
            .all(|(s, r)| s.index == r.index && s.text == r.text);
        if !in_order {
            return Err(StepError::invalid_output(
                "rendered sentences are not in input order",
            ));
        }
        Ok(())
    }
}
