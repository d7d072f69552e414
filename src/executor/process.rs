//! External process execution
//!
//! Runs shell commands in an example directory and judges their outcome
//! from the exit status and captured output.

use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Lines of captured output kept in error messages
const OUTPUT_TAIL_LINES: usize = 20;

/// Errors from running one external command
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}\n{tail}", exit_label(.code))]
    ExitStatus {
        command: String,
        code: Option<i32>,
        tail: String,
    },

    #[error("`{command}` output matched failure pattern: {line}")]
    FailureOutput { command: String, line: String },

    #[error("`{command}` output did not match /{pattern}/\n{tail}")]
    MissingSuccessOutput {
        command: String,
        pattern: String,
        tail: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Toolchain diagnostics that fail a run
///
/// Any `[SEVERE]` marker fails. A `[WARNING]` marker fails unless it is an
/// asset graph notice emitted during incremental rebuilds, e.g.
/// `[WARNING] Invalidating asset graph` or
/// `[WARNING] BuildDefinition: Throwing away cached asset graph`.
#[derive(Clone, Debug)]
pub struct SeverityPattern {
    severe: Regex,
    warning: Regex,
    benign_warning: Regex,
}

impl SeverityPattern {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            severe: Regex::new(r"\[SEVERE\]")?,
            warning: Regex::new(r"\[WARNING\]")?,
            benign_warning: Regex::new(r"^ (\w+: )?(Invalidating|Throwing away cached) asset graph")?,
        })
    }

    /// Return the first offending output line, if any
    pub fn find<'a>(&self, output: &'a str) -> Option<&'a str> {
        if let Some(m) = self.severe.find(output) {
            return Some(line_at(output, m.start()));
        }

        self.warning
            .find_iter(output)
            .find(|m| !self.benign_warning.is_match(&output[m.end()..]))
            .map(|m| line_at(output, m.start()))
    }
}

/// Full line of `output` containing byte offset `pos`
fn line_at(output: &str, pos: usize) -> &str {
    let start = output[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = output[pos..]
        .find('\n')
        .map(|i| pos + i)
        .unwrap_or(output.len());
    output[start..end].trim_end_matches('\r')
}

fn tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let skip = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[skip..].join("\n")
}

/// One command to run
#[derive(Clone, Debug)]
pub struct ExecRequest {
    pub command: String,
    pub cwd: PathBuf,
    /// Output must match this for the command to succeed
    pub success_pattern: Option<Regex>,
    /// Output must not match this for the command to succeed
    pub failure_pattern: Option<SeverityPattern>,
}

impl ExecRequest {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
            success_pattern: None,
            failure_pattern: None,
        }
    }

    pub fn succeed_on(mut self, pattern: Option<Regex>) -> Self {
        self.success_pattern = pattern;
        self
    }

    pub fn fail_on(mut self, pattern: Option<SeverityPattern>) -> Self {
        self.failure_pattern = pattern;
        self
    }

    /// Judge a finished command from its exit code and combined output
    pub fn evaluate(&self, code: Option<i32>, output: &str) -> Result<(), ExecError> {
        if code != Some(0) {
            return Err(ExecError::ExitStatus {
                command: self.command.clone(),
                code,
                tail: tail(output),
            });
        }

        if let Some(line) = self.failure_pattern.as_ref().and_then(|p| p.find(output)) {
            return Err(ExecError::FailureOutput {
                command: self.command.clone(),
                line: line.to_string(),
            });
        }

        if let Some(pattern) = &self.success_pattern {
            if !pattern.is_match(output) {
                return Err(ExecError::MissingSuccessOutput {
                    command: self.command.clone(),
                    pattern: pattern.as_str().to_string(),
                    tail: tail(output),
                });
            }
        }

        Ok(())
    }
}

/// Runs external commands
#[allow(async_fn_in_trait)]
pub trait ProcessExecutor {
    /// Run the command to completion, returning its combined output on success
    async fn run(&self, request: &ExecRequest) -> Result<String, ExecError>;
}

/// Executes commands through `sh -c`
#[derive(Clone, Debug)]
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessExecutor for ShellExecutor {
    async fn run(&self, request: &ExecRequest) -> Result<String, ExecError> {
        debug!("$ {} (in {})", request.command, request.cwd.display());

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&request.command)
            .current_dir(&request.cwd)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: request.command.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        for line in combined.lines() {
            debug!("  | {}", line);
        }

        request.evaluate(output.status.code(), &combined)?;
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn severity() -> SeverityPattern {
        SeverityPattern::new().unwrap()
    }

    fn all_tests_passed() -> Option<Regex> {
        Some(Regex::new("All tests passed").unwrap())
    }

    #[test]
    fn test_benign_warnings_ignored() {
        let pattern = severity();
        assert!(pattern.find("[WARNING] Invalidating asset graph").is_none());
        assert!(pattern
            .find("[INFO] x\n[WARNING] Throwing away cached asset graph because ...")
            .is_none());
        assert!(pattern
            .find("[WARNING] BuildDefinition: Invalidating asset graph due to build script update")
            .is_none());
    }

    #[test]
    fn test_other_warnings_fail() {
        let pattern = severity();
        assert_eq!(
            pattern.find("ok\n[WARNING] Something else\nmore"),
            Some("[WARNING] Something else")
        );
        assert!(pattern
            .find("[WARNING] Invalidating asset graph\n[WARNING] Deprecated API")
            .is_some());
    }

    #[test]
    fn test_severe_fails() {
        assert_eq!(
            severity().find("a\n[SEVERE] build failed\nb"),
            Some("[SEVERE] build failed")
        );
    }

    #[test]
    fn test_evaluate_exit_code() {
        let request = ExecRequest::new("pub get", ".");
        assert!(request.evaluate(Some(0), "").is_ok());
        assert!(matches!(
            request.evaluate(Some(1), "boom"),
            Err(ExecError::ExitStatus { code: Some(1), .. })
        ));
        assert!(matches!(
            request.evaluate(None, ""),
            Err(ExecError::ExitStatus { code: None, .. })
        ));
    }

    #[test]
    fn test_evaluate_patterns() {
        let request = ExecRequest::new("pub run test", ".")
            .succeed_on(all_tests_passed())
            .fail_on(Some(severity()));

        assert!(request.evaluate(Some(0), "00:02 +3: All tests passed!").is_ok());
        assert!(matches!(
            request.evaluate(Some(0), "00:02 +3: Some tests failed."),
            Err(ExecError::MissingSuccessOutput { .. })
        ));
        assert!(matches!(
            request.evaluate(Some(0), "[SEVERE] oops\nAll tests passed!"),
            Err(ExecError::FailureOutput { .. })
        ));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let output: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let kept = tail(&output);
        assert_eq!(kept.lines().count(), OUTPUT_TAIL_LINES);
        assert!(kept.ends_with("line 29"));
    }

    #[test]
    fn test_shell_executor_success() {
        let dir = tempdir().unwrap();
        let request = ExecRequest::new("echo 'All tests passed!'", dir.path())
            .succeed_on(all_tests_passed())
            .fail_on(Some(severity()));

        let output = tokio_test::block_on(ShellExecutor::new().run(&request)).unwrap();
        assert!(output.contains("All tests passed"));
    }

    #[test]
    fn test_shell_executor_runs_in_cwd() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pubspec.yaml"), "name: demo\n").unwrap();

        let request = ExecRequest::new("cat pubspec.yaml", dir.path());
        let output = tokio_test::block_on(ShellExecutor::new().run(&request)).unwrap();
        assert!(output.contains("name: demo"));
    }

    #[test]
    fn test_shell_executor_failures() {
        let dir = tempdir().unwrap();
        let executor = ShellExecutor::new();

        let nonzero = ExecRequest::new("echo broken >&2; exit 3", dir.path());
        match tokio_test::block_on(executor.run(&nonzero)) {
            Err(ExecError::ExitStatus { code, tail, .. }) => {
                assert_eq!(code, Some(3));
                assert!(tail.contains("broken"));
            }
            other => panic!("Expected exit status error, got {other:?}"),
        }

        let warning = ExecRequest::new("echo '[WARNING] Something else'", dir.path())
            .fail_on(Some(severity()));
        assert!(matches!(
            tokio_test::block_on(executor.run(&warning)),
            Err(ExecError::FailureOutput { .. })
        ));
    }

    #[test]
    fn test_shell_executor_missing_directory() {
        let request = ExecRequest::new("true", "/nonexistent/example/dir");
        assert!(matches!(
            tokio_test::block_on(ShellExecutor::new().run(&request)),
            Err(ExecError::Spawn { .. })
        ));
    }
}
