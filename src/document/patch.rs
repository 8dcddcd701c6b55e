// src/document/patch.rs

//! Surgical field rewrites.
//!
//! A patch names one field of one task plus the value the caller believes is
//! currently there. It is applied only if that anchor still matches; the
//! replacement then overwrites exactly the value's byte range.

use tracing::debug;

use crate::document::labels::{is_empty_marker, Field};
use crate::document::Document;
use crate::errors::{Result, TaskdagError};

/// A targeted rewrite of one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPatch {
    pub field: Field,
    /// Raw value expected to be present right now.
    pub expected: String,
    pub replacement: String,
}

impl FieldPatch {
    pub fn new(field: Field, expected: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            field,
            expected: expected.into(),
            replacement: replacement.into(),
        }
    }
}

/// Apply a patch to raw document text, returning the new text.
///
/// The input is never modified; on failure the caller still holds the
/// original text.
pub fn apply(text: &str, id: &str, patch: &FieldPatch) -> Result<String> {
    let mut doc = Document::parse(text);
    doc.apply_patch(id, patch)?;
    Ok(doc.into_text())
}

impl Document {
    /// Apply one anchored patch in place.
    ///
    /// - unknown task: `TaskNotFound`
    /// - field absent: no-op if both anchor and replacement are empty markers,
    ///   otherwise `PatchNotApplied`
    /// - anchor mismatch or multi-line replacement: `PatchNotApplied`
    pub fn apply_patch(&mut self, id: &str, patch: &FieldPatch) -> Result<()> {
        let not_applied = |reason: String| TaskdagError::PatchNotApplied {
            task: id.to_string(),
            field: patch.field.name(),
            reason,
        };

        if patch.replacement.contains(['\n', '\r']) {
            return Err(not_applied("replacement spans multiple lines".to_string()));
        }

        let record = self
            .record(id)
            .ok_or_else(|| TaskdagError::TaskNotFound(id.to_string()))?;

        let Some(span) = record.field(patch.field) else {
            if is_empty_marker(&patch.expected) && is_empty_marker(&patch.replacement) {
                debug!(task = %id, field = %patch.field, "field absent and already empty; nothing to patch");
                return Ok(());
            }
            return Err(not_applied("field is missing from the task block".to_string()));
        };

        let range = span.value.clone();
        let current = &self.text()[range.clone()];
        if current != patch.expected {
            return Err(not_applied(format!(
                "expected '{}' but found '{}'",
                patch.expected, current
            )));
        }

        debug!(
            task = %id,
            field = %patch.field,
            from = %current,
            to = %patch.replacement,
            "patching field"
        );

        let mut text = String::with_capacity(self.text().len() + patch.replacement.len());
        text.push_str(&self.text()[..range.start]);
        text.push_str(&patch.replacement);
        text.push_str(&self.text()[range.end..]);
        *self = Document::parse(text);
        Ok(())
    }

    /// Build a patch anchored on the field's current value and apply it.
    pub fn set_field(&mut self, id: &str, field: Field, value: &str) -> Result<()> {
        let patch = self.patch_for(id, field, value)?;
        self.apply_patch(id, &patch)
    }

    /// Patch that replaces the current raw value (or empty, if absent).
    pub fn patch_for(&self, id: &str, field: Field, value: &str) -> Result<FieldPatch> {
        let record = self
            .record(id)
            .ok_or_else(|| TaskdagError::TaskNotFound(id.to_string()))?;
        let expected = record.raw(self.text(), field).unwrap_or_default();
        Ok(FieldPatch::new(field, expected, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    const DOC: &str = "### TASK-001: One\n- **Status**:   pending  \n- **Assignee**: -\n- **Priority**: P2\n- **Extra**: keep me\n\n### TASK-002: Two\n- **Status**: failed\n";

    #[test]
    fn rewrites_only_the_value_bytes() {
        let patch = FieldPatch::new(Field::Status, "pending", "in_progress");
        let out = apply(DOC, "TASK-001", &patch).unwrap();
        assert_eq!(out, DOC.replacen("pending", "in_progress", 1));

        let parsed = Document::parse(&out);
        assert_eq!(parsed.task("TASK-001").unwrap().status, TaskStatus::InProgress);
        assert_eq!(parsed.task("TASK-002").unwrap().status, TaskStatus::Failed);
    }

    #[test]
    fn anchor_mismatch_fails_without_change() {
        let patch = FieldPatch::new(Field::Status, "completed", "failed");
        let err = apply(DOC, "TASK-001", &patch).unwrap_err();
        assert!(matches!(err, TaskdagError::PatchNotApplied { field: "status", .. }));
    }

    #[test]
    fn missing_field_and_missing_task() {
        let patch = FieldPatch::new(Field::Module, "", "core");
        assert!(matches!(
            apply(DOC, "TASK-001", &patch),
            Err(TaskdagError::PatchNotApplied { .. })
        ));

        let clear = FieldPatch::new(Field::ClaimedAt, "", "-");
        assert_eq!(apply(DOC, "TASK-001", &clear).unwrap(), DOC);

        let patch = FieldPatch::new(Field::Status, "pending", "failed");
        assert!(matches!(
            apply(DOC, "TASK-404", &patch),
            Err(TaskdagError::TaskNotFound(id)) if id == "TASK-404"
        ));
    }

    #[test]
    fn rejects_multi_line_replacement() {
        let patch = FieldPatch::new(Field::Assignee, "-", "a\n### TASK-999: injected");
        assert!(apply(DOC, "TASK-001", &patch).is_err());
    }

    #[test]
    fn set_field_uses_current_value_as_anchor() {
        let mut doc = Document::parse(DOC);
        doc.set_field("TASK-002", Field::Status, "pending").unwrap();
        assert_eq!(doc.task("TASK-002").unwrap().status, TaskStatus::Pending);
        assert!(doc.text().contains("- **Extra**: keep me\n"));
    }
}
