// src/dag/frontier.rs

//! Executable frontier: the tasks that are safe to claim right now.

use tracing::debug;

use crate::dag::validate::{ensure_consistent, ensure_document_consistent};
use crate::document::{Document, Task, TaskMap};
use crate::errors::Result;
use crate::types::{TaskId, TaskStatus};

/// Whether every dependency of `task` exists and is completed.
pub fn deps_satisfied(task: &Task, tasks: &TaskMap) -> bool {
    task.dependencies
        .iter()
        .all(|dep| tasks.status_of(dep) == Some(TaskStatus::Completed))
}

/// Dependencies of `task` that are not (yet) completed, in written order.
pub fn unmet_dependencies(task: &Task, tasks: &TaskMap) -> Vec<TaskId> {
    task.dependencies
        .iter()
        .filter(|dep| tasks.status_of(dep) != Some(TaskStatus::Completed))
        .cloned()
        .collect()
}

/// Pending tasks whose dependencies are all completed, ordered by priority
/// (`P0` first) and then by document order.
///
/// Does not check graph consistency; see [`frontier`].
pub fn ready_tasks(tasks: &TaskMap) -> Vec<&Task> {
    let mut ready: Vec<&Task> = tasks
        .with_status(TaskStatus::Pending)
        .filter(|t| deps_satisfied(t, tasks))
        .collect();
    // Stable sort keeps document order within a priority.
    ready.sort_by_key(|t| t.priority);
    ready
}

/// Ids of the executable frontier.
///
/// Fails with the first graph error if the graph has a cycle or a dangling
/// dependency.
pub fn frontier(tasks: &TaskMap) -> Result<Vec<TaskId>> {
    ensure_consistent(tasks)?;
    let ids: Vec<TaskId> = ready_tasks(tasks).into_iter().map(|t| t.id.clone()).collect();
    debug!(ready = ?ids, "computed frontier");
    Ok(ids)
}

/// [`frontier`] of a whole document; duplicate ids also block it.
pub fn document_frontier(doc: &Document) -> Result<Vec<TaskId>> {
    ensure_document_consistent(doc)?;
    frontier(doc.tasks())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TaskdagError;
    use crate::types::Priority;

    fn task(id: &str, status: TaskStatus, priority: Priority, deps: &[&str]) -> Task {
        let mut t = Task::new(id, id);
        t.status = status;
        t.priority = priority;
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    #[test]
    fn orders_by_priority_then_document_order() {
        use Priority::*;
        use TaskStatus::*;
        let tasks: TaskMap = [
            task("TASK-001", Pending, P2, &[]),
            task("TASK-002", Pending, P0, &[]),
            task("TASK-003", Pending, P2, &[]),
            task("TASK-004", Completed, P0, &[]),
            task("TASK-005", Pending, P1, &["TASK-004"]),
            task("TASK-006", Pending, P0, &["TASK-001"]),
            task("TASK-007", InProgress, P0, &[]),
        ]
        .into_iter()
        .collect();

        let ids = frontier(&tasks).unwrap();
        assert_eq!(ids, vec!["TASK-002", "TASK-005", "TASK-001", "TASK-003"]);
        assert_eq!(frontier(&tasks).unwrap(), ids);
    }

    #[test]
    fn failed_dependency_blocks() {
        let tasks: TaskMap = [
            task("TASK-001", TaskStatus::Failed, Priority::P2, &[]),
            task("TASK-002", TaskStatus::Pending, Priority::P2, &["TASK-001"]),
        ]
        .into_iter()
        .collect();
        assert!(frontier(&tasks).unwrap().is_empty());
        let t2 = tasks.get("TASK-002").unwrap();
        assert_eq!(unmet_dependencies(t2, &tasks), vec!["TASK-001"]);
    }

    #[test]
    fn graph_errors_block_the_frontier() {
        let tasks: TaskMap = [task("TASK-001", TaskStatus::Pending, Priority::P2, &["TASK-999"])]
            .into_iter()
            .collect();
        assert!(matches!(
            frontier(&tasks),
            Err(TaskdagError::DanglingDependency { .. })
        ));
    }
}
