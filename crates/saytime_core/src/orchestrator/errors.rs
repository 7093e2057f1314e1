//! Error types for the narration pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Operation → Detail

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed; no later stage ran.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Pipeline was cancelled at a step boundary.
    #[error("Job '{job_name}' was cancelled")]
    Cancelled { job_name: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(job_name: impl Into<String>) -> Self {
        Self::Cancelled {
            job_name: job_name.into(),
        }
    }

    /// The stage error behind this failure, if any.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            PipelineError::StepFailed { source, .. } => Some(source),
            PipelineError::Cancelled { .. } => None,
        }
    }

    /// Name of the step that failed, if any.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            PipelineError::StepFailed { step_name, .. } => Some(step_name),
            PipelineError::Cancelled { .. } => None,
        }
    }
}

/// Error from a pipeline stage.
#[derive(Error, Debug)]
pub enum StepError {
    /// The per-run workspace directory could not be created.
    #[error("Failed to create workspace under {path}: {source}")]
    WorkspaceCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The silence gap could not be generated.
    #[error("Silence generation failed with exit code {exit_code}: {message}")]
    SilenceGeneration { exit_code: i32, message: String },

    /// Speech synthesis failed for one segment.
    #[error("Synthesis of segment {index} failed with exit code {exit_code}: {message}")]
    Synthesis {
        index: usize,
        exit_code: i32,
        message: String,
    },

    /// The duration of a synthesized segment could not be determined.
    #[error("Duration probe of segment {index} failed with exit code {exit_code}: {message}")]
    DurationProbe {
        index: usize,
        exit_code: i32,
        message: String,
    },

    /// The concat playlist could not be written.
    #[error("Failed to write playlist {path}: {source}")]
    PlaylistWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Concatenation failed.
    #[error("Assembly failed with exit code {exit_code}: {message}")]
    Assembly { exit_code: i32, message: String },

    /// The assembled file could not be moved to its destination.
    #[error("Failed to move {from} to {to}: {source}")]
    Finalize {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The workspace could not be removed.
    #[error("Failed to remove workspace {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Exit code of the external tool behind this error, if one was involved.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            StepError::SilenceGeneration { exit_code, .. }
            | StepError::Synthesis { exit_code, .. }
            | StepError::DurationProbe { exit_code, .. }
            | StepError::Assembly { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_error_displays_context() {
        let err = StepError::Synthesis {
            index: 4,
            exit_code: 2,
            message: "voice not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("segment 4"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("voice not found"));
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::Assembly {
            exit_code: 1,
            message: "Invalid data found".to_string(),
        };
        let pipeline_err = PipelineError::step_failed("narration", "Assemble", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("narration"));
        assert!(msg.contains("Assemble"));
        assert_eq!(pipeline_err.step_name(), Some("Assemble"));
        assert!(matches!(
            pipeline_err.step_error(),
            Some(StepError::Assembly { exit_code: 1, .. })
        ));
    }

    #[test]
    fn cancelled_has_no_step_error() {
        let err = PipelineError::cancelled("narration");
        assert!(err.step_error().is_none());
        assert!(err.to_string().contains("cancelled"));
    }
}
