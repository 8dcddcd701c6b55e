// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Coordinate parallel work on a shared task-dependency plan document.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskdag.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// Plan document argument shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct DocArg {
    /// Path to the plan document.
    #[arg(value_name = "DOC")]
    pub doc: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check the dependency graph for cycles, missing tasks and isolated tasks.
    Validate(DocArg),

    /// List the tasks that can start now.
    Frontier(DocArg),

    /// Claim a pending task whose dependencies are all completed.
    Claim {
        #[command(flatten)]
        doc: DocArg,
        #[arg(value_name = "TASK_ID", value_parser = parse_task_id)]
        task: String,
    },

    /// Mark an in-progress task completed (or failed with `--failed`).
    Complete {
        #[command(flatten)]
        doc: DocArg,
        #[arg(value_name = "TASK_ID", value_parser = parse_task_id)]
        task: String,
        /// Record the task as failed instead.
        #[arg(long)]
        failed: bool,
    },

    /// Put an in-progress or failed task back to pending.
    Reset {
        #[command(flatten)]
        doc: DocArg,
        #[arg(value_name = "TASK_ID", value_parser = parse_task_id)]
        task: String,
    },

    /// Insert a P0 fix task ahead of a failed task and re-queue it.
    InsertFix {
        #[command(flatten)]
        doc: DocArg,
        #[arg(value_name = "FAILED_ID", value_parser = parse_task_id)]
        task: String,
        /// What the fix task should do.
        #[arg(value_name = "DESCRIPTION")]
        description: String,
    },

    /// Recompute pending task priorities from the number of dependents.
    Reprioritize(DocArg),

    /// Suggest plan adjustments.
    Suggest(DocArg),

    /// Progress, artifact and static-check report after a round of work.
    Checkpoint {
        #[command(flatten)]
        doc: DocArg,
        /// Project root that related-file paths are relative to.
        #[arg(value_name = "PROJECT_ROOT")]
        root: PathBuf,
        /// Do not run the static check command.
        #[arg(long)]
        skip_lint: bool,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Task ids are case-insensitive on the command line.
fn parse_task_id(s: &str) -> Result<String, String> {
    let id = s.trim().to_uppercase();
    if id.is_empty() {
        return Err("task id must not be empty".to_string());
    }
    Ok(id)
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_upper_cased() {
        let args = CliArgs::try_parse_from(["taskdag", "claim", "plan.md", "task-003"]).unwrap();
        match args.command {
            Command::Claim { doc, task } => {
                assert_eq!(doc.doc, PathBuf::from("plan.md"));
                assert_eq!(task, "TASK-003");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "taskdag",
            "checkpoint",
            "plan.md",
            ".",
            "--skip-lint",
            "--log-level",
            "debug",
            "--config",
            "cfg.toml",
        ])
        .unwrap();
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
        assert!(matches!(args.command, Command::Checkpoint { skip_lint: true, .. }));
    }

    #[test]
    fn complete_failed_flag() {
        let args =
            CliArgs::try_parse_from(["taskdag", "complete", "plan.md", "TASK-1", "--failed"])
                .unwrap();
        assert!(matches!(args.command, Command::Complete { failed: true, .. }));
    }
}
