// src/document/mod.rs

//! Document model for the shared plan document.
//!
//! - [`labels`] holds the field label vocabulary.
//! - [`parser`] turns text into [`TaskRecord`]s with exact value byte ranges.
//! - [`model`] holds the typed [`Task`] and the ordered [`TaskMap`].
//! - [`patch`] rewrites single field values in place.
//! - [`render`] appends brand-new task blocks.
//!
//! A [`Document`] always holds the full original text; every mutation
//! splices the text and re-parses, so records never go stale and everything
//! outside the touched bytes stays byte-identical.

pub mod labels;
pub mod model;
pub mod parser;
pub mod patch;
pub mod render;

pub use labels::{Field, LabelStyle};
pub use model::{Task, TaskMap};
pub use parser::{FieldSpan, ParseIssue, TaskRecord};
pub use patch::{apply, FieldPatch};
pub use render::NewTask;

use crate::errors::{Result, TaskdagError};
use crate::types::{format_task_id, id_number, TaskId};

/// Parsed plan document plus its source text.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    records: Vec<TaskRecord>,
    tasks: TaskMap,
    issues: Vec<ParseIssue>,
}

/// Parse text straight into the ordered task map.
pub fn parse(text: &str) -> TaskMap {
    Document::parse(text).tasks
}

impl Document {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let parsed = parser::parse_document(&text);
        Self {
            text,
            records: parsed.records,
            tasks: parsed.tasks,
            issues: parsed.issues,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Like [`Document::task`] but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<&Task> {
        self.task(id)
            .ok_or_else(|| TaskdagError::TaskNotFound(id.to_string()))
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    /// Record backing a task id (first block wins on duplicates).
    pub fn record(&self, id: &str) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Label style of the first labeled field in the document.
    pub fn label_style(&self) -> LabelStyle {
        self.records
            .iter()
            .flat_map(|r| r.fields.iter())
            .map(|f| f.style)
            .next()
            .unwrap_or_default()
    }

    /// Next unused id: one past the largest numeric suffix present.
    ///
    /// Padded to `min_width` or to the widest existing suffix.
    pub fn next_task_id(&self, min_width: usize) -> TaskId {
        let max = self
            .records
            .iter()
            .filter_map(|r| id_number(&r.id))
            .max()
            .unwrap_or(0);
        let width = self
            .records
            .iter()
            .filter_map(|r| r.id.strip_prefix(crate::types::TASK_ID_PREFIX))
            .map(str::len)
            .max()
            .unwrap_or(0)
            .max(min_width);
        format_task_id(max + 1, width)
    }
}
