// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local JSON file store.
//!
//! Holds the whole [`Document`] in one pretty-printed JSON file. Reads never
//! fail: a missing or corrupt file yields the default document.

use crate::models::Document;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Synchronous single-file document store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, substituting the default on any failure.
    ///
    /// A file that exists but cannot be parsed is copied to
    /// [`LocalStore::corrupt_path`] first, so the next save does not destroy
    /// the only copy.
    pub fn load(&self) -> Document {
        match self.try_load() {
            Ok(doc) => doc,
            Err(LocalStoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Local database not found, using empty document");
                Document::default()
            }
            Err(e @ LocalStoreError::Parse(_)) => {
                tracing::error!(path = %self.path.display(), error = %e, "Local database is corrupt");
                self.preserve_corrupt();
                Document::default()
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read local database");
                Document::default()
            }
        }
    }

    /// Where an unparseable database file is copied before it is replaced.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "db.json".into());
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn preserve_corrupt(&self) {
        let backup = self.corrupt_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => tracing::warn!(backup = %backup.display(), "Copied corrupt local database aside"),
            Err(e) => {
                tracing::error!(backup = %backup.display(), error = %e, "Failed to copy corrupt local database")
            }
        }
    }

    /// Write the document, logging and swallowing any failure.
    pub fn save(&self, doc: &Document) {
        if let Err(e) = self.try_save(doc) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write local database");
        }
    }

    /// Read and parse the document.
    pub fn try_load(&self) -> Result<Document, LocalStoreError> {
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(LocalStoreError::Parse)
    }

    /// Serialize and replace the file.
    ///
    /// The document is written to a uniquely named temp file in the same
    /// directory and renamed over the target, so readers see either the old
    /// or the new document even when saves overlap.
    pub fn try_save(&self, doc: &Document) -> Result<(), LocalStoreError> {
        let json = serde_json::to_string_pretty(doc).map_err(LocalStoreError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| LocalStoreError::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "Local database written");
        Ok(())
    }
}

/// Errors from local store operations.
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse database file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize database: {0}")]
    Serialize(#[source] serde_json::Error),
}
