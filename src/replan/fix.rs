// src/replan/fix.rs

//! Corrective task insertion ahead of a failed task.

use tracing::info;

use crate::dag::ensure_document_consistent;
use crate::document::labels::LabelStyle;
use crate::document::render::render_dependencies;
use crate::document::{Document, Field, NewTask};
use crate::errors::{Result, TaskdagError};
use crate::lifecycle::reset_fields;
use crate::types::{Priority, TaskId, TaskStatus};

/// Outcome of a fix-task insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixInsertion {
    pub fix_id: TaskId,
    pub target: TaskId,
}

/// Insert a `P0` fix task and make the failed task wait for it.
///
/// The target must exist and be `failed`. It gains the new id as a
/// dependency and goes back to `pending` with its claim cleared. The fix task
/// gets the next unused id, padded to at least `id_width` digits.
pub fn insert_fix_task(
    doc: &mut Document,
    failed_id: &str,
    description: &str,
    id_width: usize,
) -> Result<FixInsertion> {
    let target = doc.require(failed_id)?;
    if target.status != TaskStatus::Failed {
        return Err(TaskdagError::InvalidTransition {
            task: failed_id.to_string(),
            from: target.status,
            event: "insert-fix",
        });
    }
    ensure_document_consistent(doc)?;

    let style = doc.label_style();
    let fix_id = doc.next_task_id(id_width);
    let mut dependencies = target.dependencies.clone();
    dependencies.push(fix_id.clone());

    let fix = fix_task(&fix_id, failed_id, description, style);

    let mut next = doc.clone();
    next.append_task(&fix)?;
    next.set_field(
        failed_id,
        Field::Dependencies,
        &render_dependencies(&dependencies, style),
    )?;
    reset_fields(&mut next, failed_id)?;
    *doc = next;

    info!(task = %failed_id, fix = %fix_id, "inserted fix task");
    Ok(FixInsertion {
        fix_id,
        target: failed_id.to_string(),
    })
}

fn fix_task(fix_id: &str, failed_id: &str, description: &str, style: LabelStyle) -> NewTask {
    let (name, module, acceptance) = match style {
        LabelStyle::English => (
            format!("Fix {failed_id}"),
            "fix".to_string(),
            format!("{failed_id} can be re-executed"),
        ),
        LabelStyle::Chinese => (
            format!("修复 {failed_id}"),
            "修复".to_string(),
            format!("{failed_id} 可以重新执行"),
        ),
    };
    NewTask {
        id: fix_id.to_string(),
        name,
        priority: Priority::P0,
        dependencies: Vec::new(),
        module,
        description: description.to_string(),
        acceptance_criteria: acceptance,
    }
}
