//! Gap step - generates the silence inserted after every sentence.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};

/// Generates the silence gap with the media tool.
///
/// A zero duration disables the gap; the step is then skipped and the
/// playlist lists sentences back to back.
pub struct GapStep;

impl GapStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GapStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for GapStep {
    fn name(&self) -> &str {
        "Gap"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::GapReady
    }

    fn description(&self) -> &str {
        "Generate silence gap"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let gap = &ctx.settings.gap;
        if !gap.duration_secs.is_finite() || gap.duration_secs < 0.0 {
            return Err(StepError::invalid_input(format!(
                "gap duration must be a non-negative number of seconds, got {}",
                gap.duration_secs
            )));
        }
        match ctx.settings.gap_format() {
            None => Err(StepError::invalid_input(format!(
                "cannot derive gap format from data format '{}'; set [gap] codec and sample_rate",
                ctx.settings.synthesis.data_format
            ))),
            Some(format) if format.sample_rate == 0 => {
                Err(StepError::invalid_input("gap sample rate must be positive"))
            }
            Some(_) => Ok(()),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let gap = &ctx.settings.gap;
        if gap.duration_secs == 0.0 {
            return Ok(StepOutcome::Skipped("gap duration is zero".to_string()));
        }

        let format = ctx
            .settings
            .gap_format()
            .ok_or_else(|| StepError::precondition_failed("gap format is not known"))?;
        ctx.logger.info(&format!(
            "Generating {}s of silence as {} at {} Hz",
            gap.duration_secs, format.codec, format.sample_rate
        ));

        let path = ctx
            .workspace
            .generate_gap(ctx.media, gap.duration_secs, &format)
            .inspect_err(|e| ctx.log_tool_failure("silence generation", e))?;

        state.gap = Some(path.to_path_buf());
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.gap {
            Some(ref path) if path.exists() => Ok(()),
            _ => Err(StepError::invalid_output("silence gap was not recorded")),
        }
    }
}
