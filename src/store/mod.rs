// src/store/mod.rs

//! Loading and committing the plan document.
//!
//! Mutations follow read, validate, mutate, write. The content hash taken
//! at load time is compared with the file's hash right before writing; a
//! mismatch means another writer got there first and nothing is written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use blake3::Hasher;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::errors::{Result, TaskdagError};
use crate::fs::{FileSystem, RealFileSystem};

/// blake3 hex digest of the document bytes.
pub fn content_version(text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// A parsed document plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Document,
    pub version: String,
}

/// The plan document at one path.
#[derive(Debug, Clone)]
pub struct PlanStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl PlanStore {
    /// Store backed by the real file system.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), path)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String> {
        if !self.fs.is_file(&self.path) {
            return Err(TaskdagError::DocumentNotFound(self.path.clone()));
        }
        Ok(self.fs.read_to_string(&self.path)?)
    }

    pub fn load(&self) -> Result<Snapshot> {
        let text = self.read()?;
        let version = content_version(&text);
        debug!(path = %self.path.display(), %version, "loaded plan document");
        Ok(Snapshot {
            document: Document::parse(text),
            version,
        })
    }

    /// Write `document` if the file is still at `expected_version`.
    ///
    /// Returns `false` without writing when the text did not change.
    pub fn commit(&self, expected_version: &str, document: &Document) -> Result<bool> {
        let current = content_version(&self.read()?);
        if current != expected_version {
            warn!(
                path = %self.path.display(),
                expected = %expected_version,
                found = %current,
                "plan document changed since it was read"
            );
            return Err(TaskdagError::ConcurrentModification(self.path.clone()));
        }

        if content_version(document.text()) == current {
            debug!(path = %self.path.display(), "document unchanged; not rewriting");
            return Ok(false);
        }

        self.fs.write(&self.path, document.text().as_bytes())?;
        info!(path = %self.path.display(), "plan document written");
        Ok(true)
    }

    /// Load, run `f` on the document, and commit the result.
    ///
    /// If `f` fails, or the file changed in the meantime, nothing is written.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let Snapshot {
            mut document,
            version,
        } = self.load()?;
        let out = f(&mut document)?;
        self.commit(&version, &document)?;
        Ok(out)
    }
}
