//! Execution of a built invocation and classification of its outcome.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::app::{command, patterns};
use crate::domain::errors::PackError;
use crate::domain::model::{ExecutionResult, PackInvocation, PackOptions};
use crate::infra::config::Config;
use crate::infra::locator::ToolLocator;
use crate::infra::permissions;

/// Resolves repomix, launches it once, and classifies what happened.
#[derive(Debug, Clone)]
pub struct Runner {
    locator: ToolLocator,
}

impl Runner {
    pub fn new(locator: ToolLocator) -> Self {
        Self { locator }
    }

    /// Run `invocation` in `cwd`. Every failure comes back as a failed result.
    pub fn run(&self, invocation: &PackInvocation, cwd: &Path) -> ExecutionResult {
        match self.try_run(invocation, cwd) {
            Ok(result) => result,
            Err(err) => failure(err),
        }
    }

    /// Resolve, repair permissions, execute, classify.
    pub fn try_run(
        &self,
        invocation: &PackInvocation,
        cwd: &Path,
    ) -> Result<ExecutionResult, PackError> {
        let tool = self.locator.resolve()?;

        if !tool.via_shell {
            permissions::ensure_executable(&tool.program)?;
        }

        tracing::info!(
            program = %tool.program.display(),
            origin = ?tool.origin,
            args = %invocation.display_args(),
            "running repomix"
        );
        let output = tool
            .command(&invocation.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PackError::LaunchError {
                program: tool.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        classify(output.status.code(), stdout, stderr, &invocation.output_path)
    }
}

/// Decide the outcome of a finished process.
///
/// A zero exit code only counts as success when the output file exists.
pub fn classify(
    code: Option<i32>,
    stdout: String,
    stderr: String,
    output_path: &Path,
) -> Result<ExecutionResult, PackError> {
    match code {
        Some(0) if output_path.exists() => Ok(ExecutionResult::succeeded(
            stdout,
            stderr,
            output_path.to_path_buf(),
        )),
        Some(0) => Err(PackError::SilentFailure {
            path: output_path.to_path_buf(),
            stdout,
            stderr,
        }),
        code => Err(PackError::ToolFailure {
            code,
            stdout,
            stderr,
        }),
    }
}

fn failure(err: PackError) -> ExecutionResult {
    tracing::warn!(kind = err.kind().as_str(), error = %err, "pack failed");
    ExecutionResult::from(&err)
}

/// Front door used by the UI: options in, result out.
#[derive(Debug, Clone)]
pub struct Packer {
    runner: Runner,
    cwd: PathBuf,
}

impl Packer {
    pub fn new(runner: Runner, cwd: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            cwd: cwd.into(),
        }
    }

    pub fn from_config(config: &Config, cwd: impl Into<PathBuf>) -> Self {
        Self::new(Runner::new(ToolLocator::from_settings(&config.tool)), cwd)
    }

    /// Directory the output file is written to.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Build the invocation without running anything.
    pub fn prepare(&self, options: &PackOptions) -> Result<PackInvocation, PackError> {
        for warning in patterns::validate("include", options.include_patterns.as_deref())
            .into_iter()
            .chain(patterns::validate("ignore", options.ignore_patterns.as_deref()))
        {
            tracing::warn!("{}", warning.message());
        }
        command::build_invocation(options, &self.cwd)
    }

    pub fn execute(&self, invocation: &PackInvocation) -> ExecutionResult {
        let result = self.runner.run(invocation, &self.cwd);
        if result.success {
            tracing::info!(
                output = %invocation.output_path.display(),
                "pack finished"
            );
        }
        result
    }

    /// Build and run one invocation.
    pub fn pack(&self, options: &PackOptions) -> ExecutionResult {
        match self.prepare(options) {
            Ok(invocation) => self.execute(&invocation),
            Err(err) => failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::model::FailureKind;

    #[test]
    fn zero_exit_with_output_is_success() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("out.xml");
        fs::write(&output, "<packed/>").unwrap();

        let result = classify(Some(0), "ok".into(), String::new(), &output).unwrap();
        assert!(result.success);
        assert_eq!(result.output_path.as_deref(), Some(output.as_path()));
        assert_eq!(result.stdout, "ok");
        assert_eq!(result.failure, None);
    }

    #[test]
    fn zero_exit_without_output_is_silent_failure() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("out.xml");

        let err = classify(Some(0), String::new(), "no files".into(), &output).unwrap_err();
        assert_eq!(err.kind(), FailureKind::SilentFailure);

        let result = failure(err);
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::SilentFailure));
        assert_eq!(result.output_path, None);
        assert!(result.stderr.contains("no files"));
    }

    #[test]
    fn non_zero_exit_is_tool_failure_even_with_output() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("out.xml");
        fs::write(&output, "stale").unwrap();

        let err = classify(Some(1), "out".into(), "err".into(), &output).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ToolFailure);
        let result = failure(err);
        assert_eq!(result.stdout, "out");
        assert!(result.stderr.contains("exit code 1"));
        assert!(result.stderr.contains("Stderr:\nerr"));
    }

    #[test]
    fn missing_exit_code_is_tool_failure() {
        let temp = tempfile::tempdir().unwrap();
        let err = classify(None, String::new(), String::new(), &temp.path().join("x")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ToolFailure);
    }

    #[test]
    fn missing_input_fails_before_resolution() {
        let temp = tempfile::tempdir().unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        let locator = ToolLocator::new(crate::infra::locator::Platform::current())
            .with_search_path(empty.as_os_str())
            .with_install_dir(&empty);
        let packer = Packer::new(Runner::new(locator), temp.path());

        let options = PackOptions::new("nowhere", Default::default());
        let result = packer.pack(&options);
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::InputNotFound));
        assert!(result.stderr.contains("input path not found"));
    }
}
