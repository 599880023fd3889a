//! External CLI invocation
//!
//! Every adapter shells out through a [`CliTool`]: it knows the binary name,
//! how long a command may take, and how to turn a failed run into a typed
//! [`StageError`].

use crate::error::{StageError, StageErrorKind};
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for quick probes such as `--version`
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a full command run
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Static description of a CLI tool
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Name of the binary on PATH (e.g. "git")
    pub name: &'static str,
    /// Display name for user-facing messages
    pub display_name: &'static str,
    /// Where to get the tool when it is missing
    pub install_hint: &'static str,
}

/// Captured output of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Every line of stdout followed by every line of stderr
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }
}

/// Runs one CLI tool with captured output and a timeout
#[derive(Debug, Clone)]
pub struct CliTool {
    config: ToolConfig,
    timeout: Duration,
    inherit_stdin: bool,
}

impl CliTool {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
            inherit_stdin: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Let the tool read from the terminal (first-time logins)
    pub fn with_terminal_input(mut self) -> Self {
        self.inherit_stdin = true;
        self
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Whether `<tool> --version` runs and exits successfully
    pub async fn is_installed(&self) -> bool {
        self.get_version().await.is_some()
    }

    /// Trimmed first line of `<tool> --version`
    pub async fn get_version(&self) -> Option<String> {
        let probe = TokioCommand::new(self.config.name)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(PROBE_TIMEOUT, probe).await {
            Ok(Ok(output)) if output.status.success() => String::from_utf8(output.stdout)
                .ok()
                .and_then(|s| s.lines().next().map(|l| l.trim().to_string())),
            _ => None,
        }
    }

    /// Human-readable command line, used in messages and fallbacks
    pub fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.config.name)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the tool in `dir`. A non-zero exit, a timeout or a spawn failure
    /// becomes a `StageError` of `kind`; a missing binary becomes
    /// `StageErrorKind::ToolMissing`.
    pub async fn run(
        &self,
        args: &[&str],
        dir: &Path,
        kind: StageErrorKind,
    ) -> Result<CommandOutput, StageError> {
        let command_line = self.command_line(args);
        tracing::debug!(command = %command_line, dir = %dir.display(), "running");

        match self.exec(args, dir).await {
            Ok(output) if output.status.success() => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = stderr
                    .lines()
                    .rev()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("")
                    .trim();
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                tracing::debug!(command = %command_line, %code, stderr = %stderr, "command failed");

                let message = if detail.is_empty() {
                    format!("`{}` exited with status {}", command_line, code)
                } else {
                    format!("`{}` exited with status {}: {}", command_line, code, detail)
                };
                Err(StageError::new(kind, message))
            }
            Err(err) => {
                let missing = err
                    .downcast_ref::<io::Error>()
                    .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
                if missing {
                    Err(StageError::new(
                        StageErrorKind::ToolMissing,
                        format!(
                            "{} is not installed. {}",
                            self.config.display_name, self.config.install_hint
                        ),
                    ))
                } else {
                    let message = format!("`{}` failed: {:#}", command_line, err);
                    Err(StageError::new(kind, message).with_source(err))
                }
            }
        }
    }

    async fn exec(&self, args: &[&str], dir: &Path) -> Result<Output> {
        let stdin = if self.inherit_stdin {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let child = TokioCommand::new(self.config.name)
            .args(args)
            .current_dir(dir)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.with_context(|| format!("failed to wait for {}", self.config.name)),
            Err(_) => anyhow::bail!(
                "timed out after {} seconds",
                self.timeout.as_secs()
            ),
        }
    }
}

/// git
pub fn git_tool() -> CliTool {
    CliTool::new(ToolConfig {
        name: "git",
        display_name: "Git",
        install_hint: "Install it from https://git-scm.com/downloads",
    })
}

/// GitHub CLI, used only as a token source
pub fn gh_tool() -> CliTool {
    CliTool::new(ToolConfig {
        name: "gh",
        display_name: "GitHub CLI",
        install_hint: "Install it from https://cli.github.com",
    })
    .with_timeout(PROBE_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(name: &'static str) -> CliTool {
        CliTool::new(ToolConfig {
            name,
            display_name: name,
            install_hint: "",
        })
    }

    #[test]
    fn test_command_line() {
        assert_eq!(
            git_tool().command_line(&["commit", "-m", "msg"]),
            "git commit -m msg"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_missing() {
        let dir = TempDir::new().unwrap();
        let missing = CliTool::new(ToolConfig {
            name: "scaffauth-definitely-not-a-binary",
            display_name: "Nothing",
            install_hint: "Install it somewhere.",
        });

        assert!(!missing.is_installed().await);
        let err = missing
            .run(&["--help"], dir.path(), StageErrorKind::Deploy)
            .await
            .unwrap_err();
        assert_eq!(err.kind, StageErrorKind::ToolMissing);
        assert!(err.message.contains("Nothing is not installed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_keeps_kind_and_stderr() {
        let dir = TempDir::new().unwrap();
        let err = tool("sh")
            .run(
                &["-c", "echo boom >&2; exit 3"],
                dir.path(),
                StageErrorKind::Install,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, StageErrorKind::Install);
        assert!(err.message.contains("status 3"));
        assert!(err.message.ends_with("boom"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_is_captured_in_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let output = tool("sh")
            .run(&["-c", "ls; echo warn >&2"], dir.path(), StageErrorKind::Deploy)
            .await
            .unwrap();
        assert!(output.stdout.contains("marker.txt"));
        assert_eq!(output.lines().last(), Some("warn"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_maps_to_kind() {
        let dir = TempDir::new().unwrap();
        let err = tool("sh")
            .with_timeout(Duration::from_millis(100))
            .run(&["-c", "sleep 5"], dir.path(), StageErrorKind::Deploy)
            .await
            .unwrap_err();
        assert_eq!(err.kind, StageErrorKind::Deploy);
        assert!(err.message.contains("timed out"));
    }
}
