// src/lifecycle/mod.rs

//! Per-task state machine.
//!
//! ```text
//! pending     --claim-->    in_progress
//! in_progress --complete--> completed
//! in_progress --fail-->     failed
//! in_progress --reset-->    pending
//! failed      --reset-->    pending
//! ```
//!
//! Every transition works on a scratch copy of the document and only replaces
//! the caller's document once all field patches succeeded.

pub mod clock;
pub mod session;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

pub use clock::{Clock, FixedClock, SystemClock, CLAIM_TIME_FORMAT};
pub use session::{RandomSessionIds, SequentialSessionIds, SessionIdGenerator};

use crate::dag::{ensure_document_consistent, unmet_dependencies};
use crate::document::labels::EMPTY_MARKER;
use crate::document::{Document, Field};
use crate::errors::{Result, TaskdagError};
use crate::types::{TaskId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Claim,
    Complete,
    Fail,
    Reset,
}

impl LifecycleEvent {
    pub fn name(self) -> &'static str {
        match self {
            LifecycleEvent::Claim => "claim",
            LifecycleEvent::Complete => "complete",
            LifecycleEvent::Fail => "fail",
            LifecycleEvent::Reset => "reset",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target status of `event` from `from`, or `None` if the move is illegal.
pub fn transition(from: TaskStatus, event: LifecycleEvent) -> Option<TaskStatus> {
    use LifecycleEvent::*;
    use TaskStatus::*;
    match (from, event) {
        (Pending, Claim) => Some(InProgress),
        (InProgress, Complete) => Some(Completed),
        (InProgress, Fail) => Some(Failed),
        (InProgress | Failed, Reset) => Some(Pending),
        _ => None,
    }
}

/// A successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub task: TaskId,
    pub session_id: String,
    pub claimed_at: String,
}

/// Applies lifecycle events to a document.
#[derive(Clone)]
pub struct Lifecycle {
    clock: Arc<dyn Clock>,
    sessions: Arc<dyn SessionIdGenerator>,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle").finish_non_exhaustive()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomSessionIds::new()))
    }
}

impl Lifecycle {
    pub fn new(clock: Arc<dyn Clock>, sessions: Arc<dyn SessionIdGenerator>) -> Self {
        Self { clock, sessions }
    }

    /// `pending -> in_progress`, assigning a fresh session id and claim time.
    ///
    /// Checked in order: task exists, status allows a claim, graph is
    /// consistent, every dependency is completed.
    pub fn claim(&self, doc: &mut Document, id: &str) -> Result<Claim> {
        let task = doc.require(id)?;
        let to = legal(id, task.status, LifecycleEvent::Claim)?;

        ensure_document_consistent(doc)?;
        let unmet = unmet_dependencies(task, doc.tasks());
        if !unmet.is_empty() {
            return Err(TaskdagError::UnsatisfiedDependency {
                task: id.to_string(),
                unmet,
            });
        }

        let now = self.clock.now();
        let claim = Claim {
            task: id.to_string(),
            session_id: self.sessions.generate(now),
            claimed_at: now.format(CLAIM_TIME_FORMAT).to_string(),
        };

        let mut next = doc.clone();
        next.set_field(id, Field::Status, to.as_str())?;
        next.set_field(id, Field::Assignee, &claim.session_id)?;
        next.set_field(id, Field::ClaimedAt, &claim.claimed_at)?;
        *doc = next;

        info!(task = %id, session = %claim.session_id, "task claimed");
        Ok(claim)
    }

    /// `in_progress -> completed`. Only the status changes.
    pub fn complete(&self, doc: &mut Document, id: &str) -> Result<()> {
        set_status(doc, id, LifecycleEvent::Complete)
    }

    /// `in_progress -> failed`. Only the status changes.
    pub fn fail(&self, doc: &mut Document, id: &str) -> Result<()> {
        set_status(doc, id, LifecycleEvent::Fail)
    }

    /// `in_progress | failed -> pending`, clearing assignee and claim time.
    pub fn reset(&self, doc: &mut Document, id: &str) -> Result<()> {
        let task = doc.require(id)?;
        legal(id, task.status, LifecycleEvent::Reset)?;
        reset_fields(doc, id)
    }

    /// Dispatch on an event; claims return their session details.
    pub fn apply(
        &self,
        doc: &mut Document,
        id: &str,
        event: LifecycleEvent,
    ) -> Result<Option<Claim>> {
        match event {
            LifecycleEvent::Claim => self.claim(doc, id).map(Some),
            LifecycleEvent::Complete => self.complete(doc, id).map(|_| None),
            LifecycleEvent::Fail => self.fail(doc, id).map(|_| None),
            LifecycleEvent::Reset => self.reset(doc, id).map(|_| None),
        }
    }
}

fn legal(id: &str, from: TaskStatus, event: LifecycleEvent) -> Result<TaskStatus> {
    transition(from, event).ok_or_else(|| {
        debug!(task = %id, %from, %event, "rejected transition");
        TaskdagError::InvalidTransition {
            task: id.to_string(),
            from,
            event: event.name(),
        }
    })
}

fn set_status(doc: &mut Document, id: &str, event: LifecycleEvent) -> Result<()> {
    let task = doc.require(id)?;
    let from = task.status;
    let to = legal(id, from, event)?;
    doc.set_field(id, Field::Status, to.as_str())?;
    info!(task = %id, %from, %to, "task status changed");
    Ok(())
}

/// Status back to pending with assignee and claim time cleared, without a
/// transition check. Shared with fix-task insertion.
pub(crate) fn reset_fields(doc: &mut Document, id: &str) -> Result<()> {
    let from = doc.require(id)?.status;
    let mut next = doc.clone();
    next.set_field(id, Field::Status, TaskStatus::Pending.as_str())?;
    next.set_field(id, Field::Assignee, EMPTY_MARKER)?;
    next.set_field(id, Field::ClaimedAt, EMPTY_MARKER)?;
    *doc = next;
    info!(task = %id, %from, "task reset to pending");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
### TASK-001: Schema
- **Status**: pending
- **Assignee**: -
- **Claim Time**: -
- **Priority**: P1
- **Dependencies**: none

### TASK-002: API
- **Status**: pending
- **Assignee**: -
- **Claim Time**: -
- **Priority**: P2
- **Dependencies**: [TASK-001]
";

    fn lifecycle() -> Lifecycle {
        Lifecycle::new(
            Arc::new(FixedClock::at("2024-05-01 09:30:00").unwrap()),
            Arc::new(SequentialSessionIds::default()),
        )
    }

    #[test]
    fn transition_table() {
        use LifecycleEvent::*;
        use TaskStatus::*;
        for from in TaskStatus::ALL {
            for event in [Claim, Complete, Fail, Reset] {
                let expected = match (from, event) {
                    (Pending, Claim) => Some(InProgress),
                    (InProgress, Complete) => Some(Completed),
                    (InProgress, Fail) => Some(Failed),
                    (InProgress, Reset) | (Failed, Reset) => Some(Pending),
                    _ => None,
                };
                assert_eq!(transition(from, event), expected, "{from} --{event}-->");
            }
        }
    }

    #[test]
    fn claim_sets_session_and_time() {
        let mut doc = Document::parse(PLAN);
        let claim = lifecycle().claim(&mut doc, "TASK-001").unwrap();
        assert_eq!(claim.session_id, "session-test-1");
        assert_eq!(claim.claimed_at, "2024-05-01 09:30:00");

        let task = doc.task("TASK-001").unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assignee.as_deref(), Some("session-test-1"));
        assert_eq!(task.claimed_at.as_deref(), Some("2024-05-01 09:30:00"));
    }

    #[test]
    fn second_claim_is_rejected_and_keeps_first_assignment() {
        let lc = lifecycle();
        let mut doc = Document::parse(PLAN);
        lc.claim(&mut doc, "TASK-001").unwrap();
        let before = doc.text().to_string();

        let err = lc.claim(&mut doc, "TASK-001").unwrap_err();
        assert!(matches!(
            err,
            TaskdagError::InvalidTransition { from: TaskStatus::InProgress, event: "claim", .. }
        ));
        assert_eq!(doc.text(), before);
    }

    #[test]
    fn claim_requires_completed_dependencies() {
        let mut doc = Document::parse(PLAN);
        let err = lifecycle().claim(&mut doc, "TASK-002").unwrap_err();
        assert!(matches!(
            err,
            TaskdagError::UnsatisfiedDependency { ref unmet, .. } if unmet == &vec!["TASK-001".to_string()]
        ));
        assert_eq!(doc.text(), PLAN);
    }

    #[test]
    fn complete_changes_status_only() {
        let lc = lifecycle();
        let mut doc = Document::parse(PLAN);
        lc.claim(&mut doc, "TASK-001").unwrap();
        lc.complete(&mut doc, "TASK-001").unwrap();
        let task = doc.task("TASK-001").unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.assignee.as_deref(), Some("session-test-1"));

        assert!(matches!(
            lc.complete(&mut doc, "TASK-001"),
            Err(TaskdagError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn reset_clears_claim_fields() {
        let lc = lifecycle();
        let mut doc = Document::parse(PLAN);
        lc.claim(&mut doc, "TASK-001").unwrap();
        lc.fail(&mut doc, "TASK-001").unwrap();
        lc.reset(&mut doc, "TASK-001").unwrap();

        let task = doc.task("TASK-001").unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assignee, None);
        assert_eq!(task.claimed_at, None);
        assert_eq!(doc.text(), PLAN);
    }

    #[test]
    fn reset_from_pending_is_invalid() {
        let mut doc = Document::parse(PLAN);
        assert!(matches!(
            lifecycle().reset(&mut doc, "TASK-001"),
            Err(TaskdagError::InvalidTransition { event: "reset", .. })
        ));
    }

    #[test]
    fn unknown_task() {
        let mut doc = Document::parse(PLAN);
        assert!(matches!(
            lifecycle().apply(&mut doc, "TASK-404", LifecycleEvent::Fail),
            Err(TaskdagError::TaskNotFound(_))
        ));
    }
}
