//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, JobState, PipelineStage, StepOutcome};

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// Once a step succeeds (or is skipped) the job moves to `stage()`.
///
/// # Example
///
/// ```ignore
/// struct SplitStep;
///
/// impl PipelineStep for SplitStep {
///     fn name(&self) -> &str { "Split" }
///
///     fn stage(&self) -> PipelineStage { PipelineStage::Split }
///
///     fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         state.segments = Some(split_sentences(ctx.text));
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
///         if state.segments()?.is_empty() {
///             return Err(StepError::invalid_output("No sentences"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Stage the job reaches once this step is done.
    fn stage(&self) -> PipelineStage;

    /// Validate inputs before execution.
    ///
    /// Called before `execute`. Should check that settings and
    /// destination allow the step to run.
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Should perform the step's processing and record results in `state`.
    /// Use `ctx.logger` for logging and `ctx.report_progress()` for progress.
    ///
    /// Returns `StepOutcome::Success` on completion, or `StepOutcome::Skipped`
    /// if the step determined it should be skipped (not an error).
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
