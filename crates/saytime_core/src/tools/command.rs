//! Blocking command runner shared by all tool adapters.

use std::ffi::OsStr;
use std::io;
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Errors from running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {stderr}")]
    Failed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// The tool succeeded but its output could not be used.
    #[error("{tool} produced unusable output: {message}")]
    InvalidOutput { tool: String, message: String },
}

impl ToolError {
    /// Create an invalid output error.
    pub fn invalid_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Exit code of the tool.
    ///
    /// `-1` when the tool could not be started or was killed by a signal,
    /// `0` when it succeeded but its output was unusable.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Spawn { .. } => -1,
            ToolError::Failed { exit_code, .. } => *exit_code,
            ToolError::InvalidOutput { .. } => 0,
        }
    }

    /// Human-readable detail without the tool name prefix.
    pub fn detail(&self) -> String {
        match self {
            ToolError::Spawn { source, .. } => source.to_string(),
            ToolError::Failed { stderr, .. } => stderr.trim().to_string(),
            ToolError::InvalidOutput { message, .. } => message.clone(),
        }
    }
}

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Run `program` with `args`, wait for it, and fail on a non-zero exit.
///
/// stdin is closed; stdout and stderr are captured.
pub fn run_tool<I, S>(program: &str, args: I) -> ToolResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!("Running: {:?}", cmd);

    let output = cmd.output().map_err(|source| ToolError::Spawn {
        tool: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: program.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(output)
}
