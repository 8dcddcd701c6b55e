// src/replan/mod.rs

//! Plan repair: fix-task insertion, topology-driven priorities and
//! suggestions.

pub mod fix;
pub mod priority;
pub mod suggest;

pub use fix::{insert_fix_task, FixInsertion};
pub use priority::{plan_priorities, reprioritize, PriorityChange};
pub use suggest::{suggest, Suggestion};

use crate::config::Config;
use crate::document::{Document, TaskMap};
use crate::errors::Result;

pub const DEFAULT_ID_WIDTH: usize = 3;
pub const DEFAULT_ORPHAN_REVIEW_THRESHOLD: usize = 3;

/// Replanning operations with their tunables bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replanner {
    pub id_width: usize,
    pub orphan_review_threshold: usize,
}

impl Default for Replanner {
    fn default() -> Self {
        Self {
            id_width: DEFAULT_ID_WIDTH,
            orphan_review_threshold: DEFAULT_ORPHAN_REVIEW_THRESHOLD,
        }
    }
}

impl Replanner {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            id_width: cfg.document.id_width,
            orphan_review_threshold: cfg.replan.orphan_review_threshold,
        }
    }

    pub fn insert_fix(
        &self,
        doc: &mut Document,
        failed_id: &str,
        description: &str,
    ) -> Result<FixInsertion> {
        insert_fix_task(doc, failed_id, description, self.id_width)
    }

    pub fn reprioritize(&self, doc: &mut Document) -> Result<Vec<PriorityChange>> {
        reprioritize(doc)
    }

    pub fn suggest(&self, tasks: &TaskMap) -> Vec<Suggestion> {
        suggest(tasks, self.orphan_review_threshold)
    }
}
