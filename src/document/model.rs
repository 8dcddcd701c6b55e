// src/document/model.rs

//! Typed task records and the ordered task map.

use std::collections::HashMap;

use crate::types::{Priority, TaskId, TaskStatus};

/// One unit of work as parsed from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Ids this task requires to be completed first. Duplicates are removed,
    /// document order is kept for display.
    pub dependencies: Vec<TaskId>,
    /// Session holding the task; only meaningful while in progress.
    pub assignee: Option<String>,
    pub claimed_at: Option<String>,
    pub related_files: Vec<String>,
    pub module: Option<String>,
    pub description: Option<String>,
    pub acceptance_criteria: Option<String>,
}

impl Task {
    /// A pending task with default fields, used by builders and tests.
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            dependencies: Vec::new(),
            assignee: None,
            claimed_at: None,
            related_files: Vec::new(),
            module: None,
            description: None,
            acceptance_criteria: None,
        }
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

/// Tasks keyed by id, iterated in document order.
#[derive(Debug, Clone, Default)]
pub struct TaskMap {
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
}

impl TaskMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task at the end of the order.
    ///
    /// Returns `false` (and keeps the existing task) if the id is taken.
    pub fn insert(&mut self, task: Task) -> bool {
        if self.tasks.contains_key(&task.id) {
            return false;
        }
        self.order.push(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.tasks.get(id).map(|t| t.status)
    }

    /// Tasks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Position of a task in document order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Tasks with the given status, in document order.
    pub fn with_status(&self, status: TaskStatus) -> impl Iterator<Item = &Task> {
        self.iter().filter(move |t| t.status == status)
    }
}

impl FromIterator<Task> for TaskMap {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut map = TaskMap::new();
        for task in iter {
            map.insert(task);
        }
        map
    }
}

impl<'a> IntoIterator for &'a TaskMap {
    type Item = &'a Task;
    type IntoIter = Box<dyn Iterator<Item = &'a Task> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
