//! Pipeline orchestrator for turning text into narrated audio.
//!
//! This module provides the infrastructure for running the narration
//! pipeline. A run consists of a sequence of steps that validate,
//! execute, and record their results in a shared `JobState`.
//!
//! # Architecture
//!
//! ```text
//! Narrator (workspace create ... destroy)
//!     └── Pipeline
//!         ├── Step: Gap
//!         ├── Step: Split
//!         ├── Step: Render
//!         ├── Step: Playlist
//!         ├── Step: Assemble
//!         └── Step: Finalize
//! ```
//!
//! # Example
//!
//! ```ignore
//! use saytime_core::orchestrator::{create_standard_pipeline, Context, JobState};
//!
//! let ctx = Context::new(text, &settings, "my_job", &workspace, dest, &synth, &media, logger);
//! let mut state = JobState::new("job-123");
//!
//! let result = create_standard_pipeline().run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod narrator;
mod pipeline;
mod step;
pub mod steps;
#[cfg(test)]
pub(crate) mod test_support;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use narrator::{default_output_path, NarrateOptions, Narrator};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AssembleStep, FinalizeStep, GapStep, PlaylistStep, RenderStep, SplitStep};
pub use types::{Context, JobState, PipelineStage, ProgressCallback, StepOutcome};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Gap - generate the silence inserted after each sentence
/// 2. Split - break the text into sentences
/// 3. Render - synthesize every sentence, bounded in parallel
/// 4. Playlist - write the concat list
/// 5. Assemble - concatenate without re-encoding
/// 6. Finalize - move the output to its destination
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(GapStep::new())
        .with_step(SplitStep::new())
        .with_step(RenderStep::new())
        .with_step(PlaylistStep::new())
        .with_step(AssembleStep::new())
        .with_step(FinalizeStep::new())
}
