// src/replan/priority.rs

//! Priority derived from graph topology.

use std::fmt;

use tracing::{debug, info};

use crate::dag::{ensure_document_consistent, DagGraph};
use crate::document::{Document, Field, TaskMap};
use crate::errors::Result;
use crate::types::{Priority, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityChange {
    pub task: TaskId,
    pub from: Priority,
    pub to: Priority,
}

impl fmt::Display for PriorityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.task, self.from, self.to)
    }
}

/// Changes that would bring every pending task to the priority implied by
/// its number of dependents. Tasks in any other status are left alone.
pub fn plan_priorities(tasks: &TaskMap) -> Vec<PriorityChange> {
    let graph = DagGraph::from_tasks(tasks);
    tasks
        .with_status(TaskStatus::Pending)
        .filter_map(|task| {
            let dependents = graph.dependent_count(&task.id);
            let to = Priority::from_dependent_count(dependents);
            debug!(task = %task.id, dependents, current = %task.priority, target = %to, "priority check");
            (to != task.priority).then(|| PriorityChange {
                task: task.id.clone(),
                from: task.priority,
                to,
            })
        })
        .collect()
}

/// Apply [`plan_priorities`] to the document, all or nothing.
///
/// Returns the changes applied; a second call without intervening edits
/// returns an empty list.
pub fn reprioritize(doc: &mut Document) -> Result<Vec<PriorityChange>> {
    ensure_document_consistent(doc)?;
    let changes = plan_priorities(doc.tasks());
    if changes.is_empty() {
        return Ok(changes);
    }

    let mut next = doc.clone();
    for change in &changes {
        next.set_field(&change.task, Field::Priority, change.to.as_str())?;
    }
    *doc = next;

    info!(changed = changes.len(), "reprioritized pending tasks");
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TaskdagError;

    fn block(id: &str, status: &str, priority: &str, deps: &str) -> String {
        format!(
            "### {id}: {id}\n- **Status**: {status}\n- **Priority**: {priority}\n- **Dependencies**: {deps}\n\n"
        )
    }

    fn plan() -> String {
        [
            block("TASK-001", "pending", "P2", "none"),
            block("TASK-002", "pending", "P2", "[TASK-001]"),
            block("TASK-003", "pending", "P2", "[TASK-001, TASK-002]"),
            block("TASK-004", "completed", "P3", "[TASK-001, TASK-002]"),
            block("TASK-005", "in_progress", "P3", "[TASK-001]"),
        ]
        .concat()
    }

    #[test]
    fn thresholds_and_idempotence() {
        let mut doc = Document::parse(plan());
        let changes = reprioritize(&mut doc).unwrap();
        assert_eq!(
            changes,
            vec![
                PriorityChange { task: "TASK-001".into(), from: Priority::P2, to: Priority::P0 },
                PriorityChange { task: "TASK-002".into(), from: Priority::P2, to: Priority::P1 },
                PriorityChange { task: "TASK-003".into(), from: Priority::P2, to: Priority::P3 },
            ]
        );
        assert_eq!(doc.task("TASK-004").unwrap().priority, Priority::P3);
        assert_eq!(doc.task("TASK-005").unwrap().priority, Priority::P3);

        let text = doc.text().to_string();
        assert!(reprioritize(&mut doc).unwrap().is_empty());
        assert_eq!(doc.text(), text);
    }

    #[test]
    fn single_dependent_maps_to_p2() {
        let text = [
            block("TASK-001", "pending", "P0", "none"),
            block("TASK-002", "pending", "P3", "[TASK-001]"),
        ]
        .concat();
        let changes = plan_priorities(&Document::parse(text).tasks().clone());
        assert_eq!(changes[0].to, Priority::P2);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn refuses_inconsistent_graphs() {
        let text = [
            block("TASK-001", "pending", "P2", "[TASK-002]"),
            block("TASK-002", "pending", "P2", "[TASK-001]"),
        ]
        .concat();
        let mut doc = Document::parse(text.clone());
        assert!(matches!(
            reprioritize(&mut doc),
            Err(TaskdagError::CycleDetected(_))
        ));
        assert_eq!(doc.text(), text);
    }
}
