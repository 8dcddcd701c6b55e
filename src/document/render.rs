// src/document/render.rs

//! Rendering and inserting brand-new task blocks.

use crate::document::labels::{no_dependencies, Field, LabelStyle, EMPTY_MARKER};
use crate::document::Document;
use crate::errors::{Result, TaskdagError};
use crate::types::{Priority, TaskId, TaskStatus};

/// A task to be appended to the document.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    pub dependencies: Vec<TaskId>,
    pub module: String,
    pub description: String,
    pub acceptance_criteria: String,
}

/// Collapse a free-text value onto one line so it fits a field line.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render the dependency field value, `[A, B]` or the style's "none".
pub fn render_dependencies(deps: &[TaskId], style: LabelStyle) -> String {
    if deps.is_empty() {
        no_dependencies(style).to_string()
    } else {
        format!("[{}]", deps.join(", "))
    }
}

impl NewTask {
    /// Full block text, header line first, every line newline-terminated.
    pub fn render(&self, style: LabelStyle) -> String {
        let line = |field: Field, value: &str| format!("- **{}**: {}\n", field.label(style), value);

        let mut out = format!("### {}: {}\n", self.id, single_line(&self.name));
        out.push_str(&line(Field::Status, TaskStatus::Pending.as_str()));
        out.push_str(&line(Field::Assignee, EMPTY_MARKER));
        out.push_str(&line(Field::ClaimedAt, EMPTY_MARKER));
        out.push_str(&line(Field::Priority, self.priority.as_str()));
        out.push_str(&line(
            Field::Dependencies,
            &render_dependencies(&self.dependencies, style),
        ));
        out.push_str(&line(Field::Module, &single_line(&self.module)));
        out.push_str(&line(Field::Description, &single_line(&self.description)));
        out.push_str(&line(
            Field::AcceptanceCriteria,
            &single_line(&self.acceptance_criteria),
        ));
        out.push_str(&line(Field::RelatedFiles, EMPTY_MARKER));
        out
    }
}

impl Document {
    /// Append a new task block right after the last existing task block
    /// (before any trailing section), or at the end of the document.
    pub fn append_task(&mut self, task: &NewTask) -> Result<()> {
        if self.task(&task.id).is_some() {
            return Err(TaskdagError::PatchNotApplied {
                task: task.id.clone(),
                field: "id",
                reason: "a task with this id already exists".to_string(),
            });
        }

        let at = self
            .records()
            .last()
            .map(|r| r.span.end)
            .unwrap_or(self.text().len());
        let (before, after) = self.text().split_at(at);

        let lead = if before.is_empty() || before.ends_with("\n\n") {
            ""
        } else if before.ends_with('\n') {
            "\n"
        } else {
            "\n\n"
        };
        let trail = if after.is_empty() { "" } else { "\n" };

        let text = format!(
            "{before}{lead}{}{trail}{after}",
            task.render(self.label_style())
        );
        *self = Document::parse(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_task() -> NewTask {
        NewTask {
            id: "TASK-003".into(),
            name: "Fix TASK-001".into(),
            priority: Priority::P0,
            dependencies: vec![],
            module: "fix".into(),
            description: "patch the\nparser".into(),
            acceptance_criteria: "TASK-001 can be re-executed".into(),
        }
    }

    #[test]
    fn inserts_before_trailing_section() {
        let doc_text = "## Tasks\n\n### TASK-001: A\n- **Status**: failed\n\n## Notes\nbye\n";
        let mut doc = Document::parse(doc_text);
        doc.append_task(&fix_task()).unwrap();

        let text = doc.text();
        assert!(text.starts_with("## Tasks\n\n### TASK-001: A\n- **Status**: failed\n\n### TASK-003: Fix TASK-001\n"));
        assert!(text.ends_with("- **Related Files**: -\n\n## Notes\nbye\n"));
        assert!(text.contains("- **Description**: patch the parser\n"));

        let t = doc.task("TASK-003").unwrap();
        assert_eq!(t.priority, Priority::P0);
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.dependencies.is_empty());
    }

    #[test]
    fn appends_at_end_and_follows_chinese_style() {
        let mut doc = Document::parse("### TASK-001: 登录\n- **状态**: failed");
        doc.append_task(&fix_task()).unwrap();
        assert!(doc.text().contains("failed\n\n### TASK-003"));
        assert!(doc.text().contains("- **依赖**: 无\n"));
        assert_eq!(doc.tasks().len(), 2);
    }

    #[test]
    fn refuses_duplicate_ids() {
        let mut doc = Document::parse("### TASK-003: taken\n");
        assert!(doc.append_task(&fix_task()).is_err());
    }
}
