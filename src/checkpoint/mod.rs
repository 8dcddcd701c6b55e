// src/checkpoint/mod.rs

//! End-of-round checkpoint over a plan and its project tree.
//!
//! A checkpoint is read-only: progress counts, related-file checks for the
//! most recently completed tasks, an optional static check per sub-project,
//! tasks blocked by failures, replanning suggestions and next steps.

pub mod artifacts;
pub mod runner;

use std::path::Path;

use tracing::info;

pub use artifacts::{check_artifacts, pattern_exists, recently_completed, MissingArtifact};
pub use runner::{CheckOutcome, CheckRunner, CommandCheckRunner, OUTPUT_PREVIEW_LINES};

use crate::config::CheckpointSection;
use crate::dag::StatusCounts;
use crate::document::{Document, TaskMap};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::replan::{Replanner, Suggestion};
use crate::types::{TaskId, TaskStatus};

/// Pending tasks held up by one failed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedTasks {
    pub failed: TaskId,
    pub waiting: Vec<TaskId>,
}

/// A recommended follow-up action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    HandleFailures(usize),
    AwaitInProgress(usize),
    PickFromFrontier,
    AllDone,
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::HandleFailures(n) => write!(f, "handle {n} failed task(s)"),
            NextStep::AwaitInProgress(n) => {
                write!(f, "wait for {n} in-progress task(s) to finish")
            }
            NextStep::PickFromFrontier => {
                write!(f, "run `taskdag frontier` to see which tasks can start")
            }
            NextStep::AllDone => write!(f, "all tasks are completed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointReport {
    pub counts: StatusCounts,
    /// Tasks whose related files were checked, in document order.
    pub checked_tasks: Vec<TaskId>,
    pub missing: Vec<MissingArtifact>,
    /// `None` when static checks were skipped.
    pub checks: Option<Vec<CheckOutcome>>,
    pub blocked: Vec<BlockedTasks>,
    pub suggestions: Vec<Suggestion>,
    pub next_steps: Vec<NextStep>,
}

impl CheckpointReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().flatten().filter(|c| !c.passed)
    }
}

/// For every failed task with pending direct dependents, those dependents.
pub fn blocked_by_failures(tasks: &TaskMap) -> Vec<BlockedTasks> {
    tasks
        .with_status(TaskStatus::Failed)
        .filter_map(|failed| {
            let waiting: Vec<TaskId> = tasks
                .with_status(TaskStatus::Pending)
                .filter(|t| t.depends_on(&failed.id))
                .map(|t| t.id.clone())
                .collect();
            (!waiting.is_empty()).then(|| BlockedTasks {
                failed: failed.id.clone(),
                waiting,
            })
        })
        .collect()
}

pub fn next_steps(counts: &StatusCounts) -> Vec<NextStep> {
    let mut steps = Vec::new();
    if counts.failed > 0 {
        steps.push(NextStep::HandleFailures(counts.failed));
    }
    if counts.in_progress > 0 {
        steps.push(NextStep::AwaitInProgress(counts.in_progress));
    }
    if counts.pending > 0 {
        steps.push(NextStep::PickFromFrontier);
    } else if counts.all_completed() {
        steps.push(NextStep::AllDone);
    }
    steps
}

/// Build a checkpoint report.
///
/// `runner` is `None` to skip static checks. Checks run only in configured
/// sub-project directories that exist under `root`.
pub async fn run_checkpoint(
    doc: &Document,
    root: &Path,
    fs: &dyn FileSystem,
    runner: Option<&dyn CheckRunner>,
    cfg: &CheckpointSection,
    replanner: &Replanner,
) -> Result<CheckpointReport> {
    let tasks = doc.tasks();
    let counts = StatusCounts::of(tasks);

    let recent = recently_completed(tasks, cfg.recent_completed);
    let missing = check_artifacts(fs, root, &recent)?;
    let checked_tasks = recent.iter().map(|t| t.id.clone()).collect();

    let checks = match runner {
        Some(runner) => {
            let mut outcomes = Vec::new();
            for sub in &cfg.subprojects {
                let dir = root.join(sub);
                if fs.is_dir(&dir) {
                    outcomes.push(runner.run_check(&dir).await);
                }
            }
            Some(outcomes)
        }
        None => None,
    };

    let report = CheckpointReport {
        counts,
        checked_tasks,
        missing,
        checks,
        blocked: blocked_by_failures(tasks),
        suggestions: replanner.suggest(tasks),
        next_steps: next_steps(&counts),
    };

    info!(
        missing = report.missing.len(),
        failed_checks = report.failed_checks().count(),
        blocked = report.blocked.len(),
        "checkpoint complete"
    );
    Ok(report)
}
