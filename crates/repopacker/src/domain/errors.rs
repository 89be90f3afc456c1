//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::{ExecutionResult, FailureKind};

/// Every way a pack invocation can fail.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("input path not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error(
        "repomix executable not found for {platform}; make sure npx is available or repomix is installed and on PATH"
    )]
    ExecutableNotFound { platform: String },

    #[error("could not make {} executable", path.display())]
    PermissionRepairFailed {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("failed to launch {}: {source}", program.display())]
    LaunchError {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("repomix failed with {}.\nStdout:\n{stdout}\nStderr:\n{stderr}", exit_label(*code))]
    ToolFailure {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error(
        "repomix reported success but the output file was not found at {}.{}",
        path.display(),
        captured_detail(stderr, stdout)
    )]
    SilentFailure {
        path: PathBuf,
        stdout: String,
        stderr: String,
    },
}

impl PackError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PackError::InputNotFound { .. } => FailureKind::InputNotFound,
            PackError::ExecutableNotFound { .. } => FailureKind::ExecutableNotFound,
            PackError::PermissionRepairFailed { .. } => FailureKind::PermissionRepairFailed,
            PackError::LaunchError { .. } => FailureKind::LaunchError,
            PackError::ToolFailure { .. } => FailureKind::ToolFailure,
            PackError::SilentFailure { .. } => FailureKind::SilentFailure,
        }
    }

    /// Stdout captured before the failure, if the tool ran at all.
    pub fn captured_stdout(&self) -> &str {
        match self {
            PackError::ToolFailure { stdout, .. } | PackError::SilentFailure { stdout, .. } => {
                stdout
            }
            _ => "",
        }
    }
}

impl From<&PackError> for ExecutionResult {
    fn from(err: &PackError) -> Self {
        ExecutionResult::failed(err.kind(), err.captured_stdout().to_owned(), err.to_string())
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by a signal)".to_string(),
    }
}

fn captured_detail(stderr: &str, stdout: &str) -> String {
    let mut detail = String::new();
    if !stderr.is_empty() {
        detail.push_str(&format!(" STDERR: {stderr}"));
    }
    if !stdout.is_empty() {
        detail.push_str(&format!(" STDOUT: {stdout}"));
    }
    detail
}
