// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{TaskId, TaskStatus};

#[derive(Error, Debug)]
pub enum TaskdagError {
    #[error("task document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("invalid transition: cannot {event} task {task} while it is {from}")]
    InvalidTransition {
        task: TaskId,
        from: TaskStatus,
        event: &'static str,
    },

    #[error("task {task} has unfinished dependencies: {}", .unmet.join(", "))]
    UnsatisfiedDependency { task: TaskId, unmet: Vec<TaskId> },

    #[error("cycle detected in task graph: {}", .0.join(" -> "))]
    CycleDetected(Vec<TaskId>),

    #[error("task id {0} is defined more than once")]
    DuplicateTask(TaskId),

    #[error("task {task} depends on missing task {missing}")]
    DanglingDependency { task: TaskId, missing: TaskId },

    #[error("could not patch field '{field}' of {task}: {reason}")]
    PatchNotApplied {
        task: TaskId,
        field: &'static str,
        reason: String,
    },

    #[error("task document {} changed on disk since it was read; retry the operation", .0.display())]
    ConcurrentModification(PathBuf),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskdagError>;
