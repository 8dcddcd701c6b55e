// src/dag/validate.rs

//! Graph validation: cycles, dangling dependencies, isolated tasks.
//!
//! Errors (cycle, dangling dependency, duplicate id) make the graph unusable
//! for planning; warnings (orphans) are advisory only.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::document::{Document, ParseIssue, TaskMap};
use crate::errors::{Result, TaskdagError};
use crate::types::TaskId;

/// A fatal graph problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Closed path `[n1, n2, ..., n1]` along dependency edges.
    Cycle(Vec<TaskId>),
    Dangling { task: TaskId, missing: TaskId },
    Duplicate { task: TaskId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Cycle(path) => write!(f, "dependency cycle: {}", path.join(" -> ")),
            GraphError::Dangling { task, missing } => {
                write!(f, "{task} depends on missing task {missing}")
            }
            GraphError::Duplicate { task } => write!(f, "{task} is defined more than once"),
        }
    }
}

impl From<GraphError> for TaskdagError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Cycle(path) => TaskdagError::CycleDetected(path),
            GraphError::Dangling { task, missing } => {
                TaskdagError::DanglingDependency { task, missing }
            }
            GraphError::Duplicate { task } => TaskdagError::DuplicateTask(task),
        }
    }
}

/// An advisory graph finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// No dependencies and no dependents.
    Orphan { task: TaskId },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::Orphan { task } => {
                write!(f, "{task} is isolated (no dependencies and no dependents)")
            }
        }
    }
}

/// Result of validating one task graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<GraphError>,
    pub warnings: Vec<GraphWarning>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The reported cycle, if any.
    pub fn cycle(&self) -> Option<&[TaskId]> {
        self.errors.iter().find_map(|e| match e {
            GraphError::Cycle(path) => Some(path.as_slice()),
            _ => None,
        })
    }

    /// `(task, missing)` pairs in document order.
    pub fn dangling(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                GraphError::Dangling { task, missing } => Some((task.as_str(), missing.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn orphans(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .map(|w| match w {
                GraphWarning::Orphan { task } => task.as_str(),
            })
            .collect()
    }

    /// First error as a crate error, or `Ok(())`.
    pub fn into_result(self) -> Result<()> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Validate a task map.
pub fn validate(tasks: &TaskMap) -> ValidationReport {
    let mut report = ValidationReport::default();

    let cycle = detect_cycle(tasks);
    if !cycle.is_empty() {
        report.errors.push(GraphError::Cycle(cycle));
    }

    report.errors.extend(
        find_dangling(tasks)
            .into_iter()
            .map(|(task, missing)| GraphError::Dangling { task, missing }),
    );

    report.warnings.extend(
        find_orphans(tasks)
            .into_iter()
            .map(|task| GraphWarning::Orphan { task }),
    );

    debug!(
        tasks = tasks.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated task graph"
    );
    report
}

/// Validate a whole document, including ids that occur more than once.
pub fn validate_document(doc: &Document) -> ValidationReport {
    let mut report = validate(doc.tasks());
    let duplicates = doc.issues().iter().filter_map(|issue| match issue {
        ParseIssue::DuplicateTask { task } => Some(GraphError::Duplicate { task: task.clone() }),
        _ => None,
    });
    report.errors.extend(duplicates);
    report
}

/// Fail with the first graph error, if any.
///
/// Guard for every operation that assumes a consistent graph.
pub fn ensure_consistent(tasks: &TaskMap) -> Result<()> {
    let cycle = detect_cycle(tasks);
    if !cycle.is_empty() {
        return Err(TaskdagError::CycleDetected(cycle));
    }
    if let Some((task, missing)) = find_dangling(tasks).into_iter().next() {
        return Err(TaskdagError::DanglingDependency { task, missing });
    }
    Ok(())
}

/// [`ensure_consistent`] plus the document-level check for ids defined more
/// than once.
pub fn ensure_document_consistent(doc: &Document) -> Result<()> {
    ensure_consistent(doc.tasks())?;
    let duplicate = doc.issues().iter().find_map(|issue| match issue {
        ParseIssue::DuplicateTask { task } => Some(task.clone()),
        _ => None,
    });
    match duplicate {
        Some(task) => Err(TaskdagError::DuplicateTask(task)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Finished,
}

/// Three-colour depth-first search for a dependency cycle.
///
/// Start nodes are taken in document order and each node's dependencies in
/// the order they are written. Returns the first cycle found as
/// `[n1, ..., n1]`, or an empty vector if the graph is acyclic. Dependencies
/// on missing tasks are ignored. All search state is local to this call.
pub fn detect_cycle(tasks: &TaskMap) -> Vec<TaskId> {
    let graph = DagGraph::from_tasks(tasks);
    let mut marks = vec![Mark::Unvisited; graph.len()];

    for start in 0..graph.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // Current recursion path plus each frame's pending children.
        let mut path: Vec<usize> = vec![start];
        let mut frames: Vec<Vec<usize>> = vec![pending_children(&graph, start)];
        marks[start] = Mark::OnStack;

        while let Some(children) = frames.last_mut() {
            let Some(next) = children.pop() else {
                if let Some(done) = path.pop() {
                    marks[done] = Mark::Finished;
                }
                frames.pop();
                continue;
            };

            match marks[next] {
                Mark::Finished => {}
                Mark::OnStack => {
                    let from = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle: Vec<TaskId> = path[from..]
                        .iter()
                        .map(|&n| graph.id_of(n).to_string())
                        .collect();
                    cycle.push(graph.id_of(next).to_string());
                    debug!(cycle = ?cycle, "dependency cycle found");
                    return cycle;
                }
                Mark::Unvisited => {
                    marks[next] = Mark::OnStack;
                    path.push(next);
                    frames.push(pending_children(&graph, next));
                }
            }
        }
    }

    Vec::new()
}

/// Children of `node` reversed, so popping yields them in written order.
fn pending_children(graph: &DagGraph, node: usize) -> Vec<usize> {
    let mut children: Vec<usize> = graph.dependency_nodes(node).collect();
    children.reverse();
    children
}

/// Every `(task, missing_dependency)` pair, in document order.
pub fn find_dangling(tasks: &TaskMap) -> Vec<(TaskId, TaskId)> {
    tasks
        .iter()
        .flat_map(|task| {
            task.dependencies
                .iter()
                .filter(|dep| !tasks.contains(dep))
                .map(|dep| (task.id.clone(), dep.clone()))
        })
        .collect()
}

/// Tasks with no dependencies that nothing depends on.
///
/// Only meaningful for documents with more than one task.
pub fn find_orphans(tasks: &TaskMap) -> Vec<TaskId> {
    if tasks.len() <= 1 {
        return Vec::new();
    }

    let depended_on: HashSet<&str> = tasks
        .iter()
        .flat_map(|t| t.dependencies.iter().map(|d| d.as_str()))
        .collect();

    tasks
        .iter()
        .filter(|t| t.dependencies.is_empty() && !depended_on.contains(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect()
}
