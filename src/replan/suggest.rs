// src/replan/suggest.rs

//! Read-only plan adjustment hints.

use std::fmt;

use crate::dag::find_orphans;
use crate::document::TaskMap;
use crate::types::{TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// A failed task that should get a fix task inserted ahead of it.
    InsertFix { target: TaskId },
    /// Isolated pending tasks worth reviewing for parallel execution or
    /// missing dependencies.
    ReviewOrphans { tasks: Vec<TaskId> },
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::InsertFix { target } => {
                write!(f, "insert a fix task before retrying {target}")
            }
            Suggestion::ReviewOrphans { tasks } => write!(
                f,
                "review {} isolated pending tasks for parallelization: {}",
                tasks.len(),
                tasks.join(", ")
            ),
        }
    }
}

/// One `InsertFix` per failed task (document order), then a single
/// `ReviewOrphans` if more than `orphan_threshold` pending tasks are orphans.
pub fn suggest(tasks: &TaskMap, orphan_threshold: usize) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = tasks
        .with_status(TaskStatus::Failed)
        .map(|t| Suggestion::InsertFix {
            target: t.id.clone(),
        })
        .collect();

    let orphans: Vec<TaskId> = find_orphans(tasks)
        .into_iter()
        .filter(|id| tasks.status_of(id) == Some(TaskStatus::Pending))
        .collect();
    if orphans.len() > orphan_threshold {
        out.push(Suggestion::ReviewOrphans { tasks: orphans });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Task;

    fn task(id: &str, status: TaskStatus, deps: &[&str]) -> Task {
        let mut t = Task::new(id, id);
        t.status = status;
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    #[test]
    fn failed_tasks_get_fix_suggestions() {
        let tasks: TaskMap = [
            task("TASK-001", TaskStatus::Completed, &[]),
            task("TASK-002", TaskStatus::Failed, &["TASK-001"]),
            task("TASK-003", TaskStatus::Failed, &["TASK-001"]),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            suggest(&tasks, 3),
            vec![
                Suggestion::InsertFix { target: "TASK-002".into() },
                Suggestion::InsertFix { target: "TASK-003".into() },
            ]
        );
    }

    #[test]
    fn orphan_review_only_above_threshold() {
        let mut tasks: TaskMap = (1..=3)
            .map(|i| task(&format!("TASK-00{i}"), TaskStatus::Pending, &[]))
            .collect();
        // A completed orphan never counts.
        tasks.insert(task("TASK-009", TaskStatus::Completed, &[]));
        assert!(suggest(&tasks, 3).is_empty());

        tasks.insert(task("TASK-004", TaskStatus::Pending, &[]));
        let out = suggest(&tasks, 3);
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], Suggestion::ReviewOrphans { tasks } if tasks.len() == 4));
        assert!(out[0].to_string().starts_with("review 4 isolated pending tasks"));
    }
}
