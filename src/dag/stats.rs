// src/dag/stats.rs

//! Status counts for progress reporting.

use std::fmt;

use crate::document::TaskMap;
use crate::types::TaskStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn of(tasks: &TaskMap) -> Self {
        let mut counts = StatusCounts::default();
        for task in tasks.iter() {
            counts.total += 1;
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Completed share in percent; 0 for an empty plan.
    pub fn completed_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn all_completed(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pending={} in_progress={} completed={} failed={}",
            self.pending, self.in_progress, self.completed, self.failed
        )
    }
}
