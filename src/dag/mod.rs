// src/dag/mod.rs

//! Dependency graph queries.
//!
//! - [`graph`] holds the petgraph-backed dependency graph of a document.
//! - [`validate`] checks for cycles, dangling references and isolated tasks.
//! - [`frontier`] computes the ordered set of tasks that are ready to start.
//! - [`stats`] counts tasks per status.
//!
//! Everything here is read-only over a [`crate::document::TaskMap`] or
//! [`crate::document::Document`].

pub mod frontier;
pub mod graph;
pub mod stats;
pub mod validate;

pub use frontier::{
    deps_satisfied, document_frontier, frontier, ready_tasks, unmet_dependencies,
};
pub use graph::DagGraph;
pub use stats::StatusCounts;
pub use validate::{
    detect_cycle, ensure_consistent, ensure_document_consistent, find_dangling, find_orphans,
    validate, validate_document, GraphError, GraphWarning, ValidationReport,
};
