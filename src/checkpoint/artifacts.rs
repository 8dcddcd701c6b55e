// src/checkpoint/artifacts.rs

//! Existence checks for the related files of completed tasks.

use std::path::Path;

use anyhow::Result;
use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};

use crate::document::{Task, TaskMap};
use crate::fs::FileSystem;
use crate::types::{TaskId, TaskStatus};

/// Directories never descended into while matching glob patterns.
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// A related-file pattern with nothing behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtifact {
    pub task: TaskId,
    pub pattern: String,
}

/// The last `n` completed tasks, in document order.
pub fn recently_completed(tasks: &TaskMap, n: usize) -> Vec<&Task> {
    let completed: Vec<&Task> = tasks.with_status(TaskStatus::Completed).collect();
    let skip = completed.len().saturating_sub(n);
    completed.into_iter().skip(skip).collect()
}

/// Every related-file pattern of `tasks` that matches nothing under `root`.
pub fn check_artifacts(
    fs: &dyn FileSystem,
    root: &Path,
    tasks: &[&Task],
) -> Result<Vec<MissingArtifact>> {
    let mut missing = Vec::new();
    for task in tasks {
        for pattern in &task.related_files {
            if !pattern_exists(fs, root, pattern)? {
                debug!(task = %task.id, %pattern, "related file missing");
                missing.push(MissingArtifact {
                    task: task.id.clone(),
                    pattern: pattern.clone(),
                });
            }
        }
    }
    Ok(missing)
}

/// Whether `pattern` names something under `root`.
///
/// A trailing `/` marks a directory and is ignored. A literal path that
/// exists always matches; otherwise patterns with glob metacharacters are
/// matched against every path under `root`. A pattern that is not a valid
/// glob matches nothing.
pub fn pattern_exists(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<bool> {
    let pattern = pattern.trim().trim_end_matches('/');
    if pattern.is_empty() {
        return Ok(true);
    }
    if fs.exists(&root.join(pattern)) {
        return Ok(true);
    }
    if !is_glob(pattern) {
        return Ok(false);
    }

    let matcher = match Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(err) => {
            warn!(%pattern, error = %err, "invalid glob pattern; reporting it as missing");
            return Ok(false);
        }
    };
    any_path_matches(fs, root, &matcher)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn any_path_matches(fs: &dyn FileSystem, root: &Path, matcher: &GlobMatcher) -> Result<bool> {
    if !fs.is_dir(root) {
        return Ok(false);
    }
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if let Ok(rel) = path.strip_prefix(root) {
                let rel_str = rel.to_string_lossy().replace('\\', "/");
                if matcher.is_match(&rel_str) {
                    return Ok(true);
                }
            }
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIP_DIRS.contains(&n));
            if fs.is_dir(&path) && !skipped {
                stack.push(path);
            }
        }
    }

    Ok(false)
}
