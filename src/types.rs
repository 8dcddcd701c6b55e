// src/types.rs

//! Shared value types: task ids, statuses and priorities.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Canonical task identifier type (`TASK-007`).
pub type TaskId = String;

/// Prefix shared by every task identifier.
pub const TASK_ID_PREFIX: &str = "TASK-";

/// Matches one task id anywhere inside a free-form string.
pub static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TASK-\d+").expect("task id regex is valid"));

/// Numeric suffix of a task id, if it has the canonical `TASK-<digits>` shape.
pub fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(TASK_ID_PREFIX)?.parse().ok()
}

/// Render a task id with a zero-padded numeric suffix.
pub fn format_task_id(number: u64, width: usize) -> TaskId {
    format!("{TASK_ID_PREFIX}{number:0width$}")
}

/// Lifecycle status of a task as recorded in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!(
                "invalid status: {other} (expected pending, in_progress, completed or failed)"
            )),
        }
    }
}

/// Advisory ordering rank. `P0` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::P2
    }
}

impl Priority {
    /// Priority implied by the number of tasks that depend on a task.
    pub fn from_dependent_count(dependents: usize) -> Self {
        match dependents {
            0 => Priority::P3,
            1 => Priority::P2,
            2 => Priority::P1,
            _ => Priority::P0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "P0" => Ok(Priority::P0),
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            "P3" => Ok(Priority::P3),
            other => Err(format!("invalid priority: {other} (expected P0..P3)")),
        }
    }
}
