// src/checkpoint/runner.rs

//! External static-check runner.
//!
//! The check is a pass/fail oracle: a command that cannot be started or that
//! exceeds its timeout counts as passed, so a missing toolchain never blocks
//! a checkpoint.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::CheckpointSection;

/// Lines of check output kept for display.
pub const OUTPUT_PREVIEW_LINES: usize = 5;

/// Result of one check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub dir: PathBuf,
    pub passed: bool,
    pub output: String,
}

impl CheckOutcome {
    fn passed(dir: &Path, output: impl Into<String>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            passed: true,
            output: output.into(),
        }
    }

    /// First [`OUTPUT_PREVIEW_LINES`] lines of the output.
    pub fn preview(&self) -> Vec<&str> {
        self.output.lines().take(OUTPUT_PREVIEW_LINES).collect()
    }
}

/// Runs a check in one directory.
///
/// Production code uses [`CommandCheckRunner`]; tests can substitute a
/// runner that does not spawn processes.
pub trait CheckRunner: Send + Sync {
    fn run_check<'a>(
        &'a self,
        dir: &'a Path,
    ) -> Pin<Box<dyn Future<Output = CheckOutcome> + Send + 'a>>;
}

/// Spawns a command in the directory and waits for it under a timeout.
#[derive(Debug, Clone)]
pub struct CommandCheckRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCheckRunner {
    /// `command[0]` is the program, the rest its arguments.
    pub fn new(command: &[String], timeout: Duration) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            timeout,
        }
    }

    pub fn from_config(cfg: &CheckpointSection) -> Self {
        Self::new(
            &cfg.check_command,
            Duration::from_secs(cfg.check_timeout_secs),
        )
    }

    fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, dir: &Path) -> CheckOutcome {
        info!(dir = %dir.display(), cmd = %self.display_command(), "running check");

        let child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "check command unavailable; treating as passed");
                return CheckOutcome::passed(dir, format!("check command unavailable: {err}"));
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!(dir = %dir.display(), timeout = ?self.timeout, "check timed out; treating as passed");
                CheckOutcome::passed(
                    dir,
                    format!("check timed out after {}s", self.timeout.as_secs()),
                )
            }
            Ok(Err(err)) => {
                warn!(dir = %dir.display(), error = %err, "waiting for check failed; treating as passed");
                CheckOutcome::passed(dir, format!("check did not finish: {err}"))
            }
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                let passed = output.status.success();
                debug!(dir = %dir.display(), exit_code = ?output.status.code(), passed, "check finished");
                CheckOutcome {
                    dir: dir.to_path_buf(),
                    passed,
                    output: text.trim_end().to_string(),
                }
            }
        }
    }
}

impl CheckRunner for CommandCheckRunner {
    fn run_check<'a>(
        &'a self,
        dir: &'a Path,
    ) -> Pin<Box<dyn Future<Output = CheckOutcome> + Send + 'a>> {
        Box::pin(self.run(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(cmd: &[&str], timeout: Duration) -> CommandCheckRunner {
        let cmd: Vec<String> = cmd.iter().map(|s| s.to_string()).collect();
        CommandCheckRunner::new(&cmd, timeout)
    }

    #[tokio::test]
    async fn missing_program_counts_as_passed() {
        let dir = tempfile::tempdir().unwrap();
        let out = runner(&["taskdag-no-such-checker"], Duration::from_secs(5))
            .run_check(dir.path())
            .await;
        assert!(out.passed);
        assert!(out.output.starts_with("check command unavailable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = runner(
            &["sh", "-c", "printf 'l1\\nl2\\nl3\\nl4\\nl5\\nl6\\n'; exit 2"],
            Duration::from_secs(5),
        )
        .run_check(dir.path())
        .await;
        assert!(!out.passed);
        assert_eq!(out.preview(), vec!["l1", "l2", "l3", "l4", "l5"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_counts_as_passed() {
        let dir = tempfile::tempdir().unwrap();
        let out = runner(&["sleep", "5"], Duration::from_millis(100))
            .run_check(dir.path())
            .await;
        assert!(out.passed);
        assert!(out.output.contains("timed out"));
    }
}
