//! Finalize step - moves the assembled file to its destination.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::models::NarrationResult;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PipelineStage, StepOutcome};

/// Moves the assembled audio out of the workspace and records the result.
pub struct FinalizeStep;

impl FinalizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FinalizeStep {
    fn default() -> Self {
        Self::new()
    }
}

/// Move `from` to `to`.
///
/// A rename across filesystems is replaced by a copy into a temporary
/// sibling of `to`, renamed into place once complete. On failure nothing is
/// left at `to`.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("{} is on another filesystem, copying", to.display());
            copy_into_place(from, to)
        }
        other => other,
    }
}

/// Copy `from` next to `to`, then rename it over `to` and drop `from`.
fn copy_into_place(from: &Path, to: &Path) -> io::Result<()> {
    let dir = to
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Removed on drop if anything below fails
    let mut staged = tempfile::Builder::new()
        .prefix(".saytime-")
        .suffix(".part")
        .tempfile_in(dir)?;
    io::copy(&mut File::open(from)?, &mut staged)?;
    staged.as_file().sync_all()?;
    staged.persist(to).map_err(|e| e.error)?;

    // The workspace is removed after the run anyway
    if let Err(e) = fs::remove_file(from) {
        tracing::warn!("Could not remove {} after copying: {}", from.display(), e);
    }
    Ok(())
}

impl PipelineStep for FinalizeStep {
    fn name(&self) -> &str {
        "Finalize"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Finalized
    }

    fn description(&self) -> &str {
        "Move output to destination"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.destination.is_dir() {
            return Err(StepError::invalid_input(format!(
                "destination {} is a directory",
                ctx.destination.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let assembled = state.assembled()?;
        let rendered = state.rendered()?;

        move_file(assembled, &ctx.destination).map_err(|source| StepError::Finalize {
            from: assembled.to_path_buf(),
            to: ctx.destination.clone(),
            source,
        })?;
        ctx.logger
            .info(&format!("Output: {}", ctx.destination.display()));

        let result = NarrationResult::from_rendered(&ctx.destination, rendered);
        state.result = Some(result);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if !ctx.destination.is_file() {
            return Err(StepError::invalid_output(format!(
                "output {} does not exist",
                ctx.destination.display()
            )));
        }
        if state.result.is_none() {
            return Err(StepError::invalid_output("narration result not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderedSegment;
    use crate::orchestrator::test_support::Harness;

    fn assembled_state(harness: &Harness) -> JobState {
        let assembled = harness.workspace.assembled_path();
        fs::write(&assembled, b"audio").unwrap();

        let mut state = JobState::new("job");
        state.rendered = Some(vec![RenderedSegment {
            index: 0,
            file_path: harness.workspace.segment_path(0),
            duration: 0.75,
            text: "Hi.".to_string(),
        }]);
        state.assembled = Some(assembled);
        state
    }

    #[test]
    fn moves_output_and_records_result() {
        let harness = Harness::new();
        let ctx = harness.context("Hi.");
        let mut state = assembled_state(&harness);

        let step = FinalizeStep::new();
        step.validate_input(&ctx).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        assert_eq!(fs::read(harness.destination()).unwrap(), b"audio");
        assert!(!harness.workspace.assembled_path().exists());

        let result = state.result.unwrap();
        assert_eq!(result.output, harness.destination());
        assert_eq!(result.parts.len(), 1);
        assert_eq!(result.parts[0].sentence, "Hi.");
        assert_eq!(result.parts[0].duration, 0.75);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("assembled.wav");
        let to = dir.path().join("nested/deeper/out.wav");
        fs::write(&from, b"x").unwrap();

        move_file(&from, &to).unwrap();

        assert!(to.is_file());
        assert!(!from.exists());
    }

    #[test]
    fn copy_keeps_destination_whole() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let from = src.path().join("assembled.wav");
        let to = dst.path().join("out.wav");
        fs::write(&from, b"narration").unwrap();

        copy_into_place(&from, &to).unwrap();

        assert_eq!(fs::read(&to).unwrap(), b"narration");
        assert!(!from.exists());
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_copy_leaves_no_output() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let to = dst.path().join("out.wav");

        // A directory opens but cannot be read, so the copy fails midway
        let unreadable = src.path().join("assembled.wav");
        fs::create_dir(&unreadable).unwrap();
        assert!(copy_into_place(&unreadable, &to).is_err());

        let missing = src.path().join("missing.wav");
        assert!(copy_into_place(&missing, &to).is_err());

        assert!(!to.exists());
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_rename_is_not_retried_as_copy() {
        let dir = tempfile::tempdir().unwrap();
        let to = dir.path().join("out.wav");

        let err = move_file(&dir.path().join("missing.wav"), &to).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!to.exists());
    }

    #[test]
    fn directory_destination_is_rejected() {
        let harness = Harness::new();
        let mut ctx = harness.context("Hi.");
        ctx.destination = harness.root.path().to_path_buf();

        let err = FinalizeStep::new().validate_input(&ctx).unwrap_err();
        assert!(matches!(err, StepError::InvalidInput(_)));
    }

    #[test]
    fn missing_assembled_file_is_finalize_error() {
        let harness = Harness::new();
        let ctx = harness.context("Hi.");
        let mut state = assembled_state(&harness);
        fs::remove_file(harness.workspace.assembled_path()).unwrap();

        let err = FinalizeStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Finalize { .. }));
    }
}
