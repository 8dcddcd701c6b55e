#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use taskdag_test_utils::builders;
pub use taskdag_test_utils::init_tracing;

/// Write a plan document into `dir` and return its path.
pub fn write_plan(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("TASKS.md");
    std::fs::write(&path, text).expect("writing plan document");
    path
}

/// Read a file back as a string.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("reading plan document")
}
