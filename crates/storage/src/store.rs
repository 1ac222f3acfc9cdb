// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned document store
//!
//! Loading never fails: anything that cannot be trusted (missing, unreadable,
//! wrong shape, unmigratable, invalid) becomes [`Loaded::Broken`] with the
//! reason attached. Saving validates first and refuses invalid documents
//! without touching the file on disk.

use crate::fs::{document_bytes, write_atomic};
use bj_core::{Document, ValidationContext, ValidationErrors};
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("invalid {kind} id '{id}'")]
    InvalidId { kind: &'static str, id: String },
    #[error("{kind} metadata at {} is broken: {reason}", path.display())]
    Broken {
        kind: &'static str,
        path: PathBuf,
        reason: BrokenReason,
    },
    #[error("refusing to save {kind} metadata at {}: {errors}", path.display())]
    ValidationRefused {
        kind: &'static str,
        path: PathBuf,
        errors: ValidationErrors,
    },
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no save point to pop")]
    NoSavePoint,
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Why a stored document could not be trusted
#[derive(Debug, Clone, PartialEq)]
pub enum BrokenReason {
    Missing,
    Unreadable(String),
    NotAMapping,
    Migration(String),
    Invalid(ValidationErrors),
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenReason::Missing => f.write_str("metadata file is missing"),
            BrokenReason::Unreadable(e) => write!(f, "metadata is unreadable: {}", e),
            BrokenReason::NotAMapping => f.write_str("metadata is not a mapping"),
            BrokenReason::Migration(e) => write!(f, "migration failed: {}", e),
            BrokenReason::Invalid(errors) => write!(f, "{}", errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrokenMetadata {
    pub reason: BrokenReason,
}

/// In-memory state of a loaded document
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<D> {
    Valid(D),
    Broken(BrokenMetadata),
}

impl<D> Loaded<D> {
    pub fn document(&self) -> Option<&D> {
        match self {
            Loaded::Valid(d) => Some(d),
            Loaded::Broken(_) => None,
        }
    }

    pub fn broken(&self) -> Option<&BrokenMetadata> {
        match self {
            Loaded::Valid(_) => None,
            Loaded::Broken(b) => Some(b),
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, Loaded::Broken(_))
    }
}

/// Result of a save-point block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePoint<T> {
    /// Keep the edits made inside the block
    Keep(T),
    /// Restore the document to its state before the block
    Discard(T),
}

impl<T> SavePoint<T> {
    pub fn into_value(self) -> T {
        match self {
            SavePoint::Keep(value) | SavePoint::Discard(value) => value,
        }
    }
}

pub struct MetadataStore<D: Document> {
    path: PathBuf,
    loaded: Loaded<D>,
    save_points: Vec<Loaded<D>>,
    errors: ValidationErrors,
}

impl<D: Document> fmt::Debug for MetadataStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataStore")
            .field("path", &self.path)
            .field("loaded", &self.loaded)
            .field("save_points", &self.save_points.len())
            .finish()
    }
}

fn read_document<D: Document>(path: &Path) -> Loaded<D> {
    let broken =
        |reason: BrokenReason| -> Loaded<D> { Loaded::Broken(BrokenMetadata { reason }) };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return broken(BrokenReason::Missing),
        Err(e) => return broken(BrokenReason::Unreadable(e.to_string())),
    };
    let value: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => return broken(BrokenReason::Unreadable(format!("invalid JSON: {}", e))),
    };
    if !value.is_object() {
        return broken(BrokenReason::NotAMapping);
    }
    let document = match D::from_value(value) {
        Ok(d) => d,
        Err(e) => return broken(BrokenReason::Migration(e.to_string())),
    };
    let errors = document.validate(ValidationContext::Load);
    if !errors.is_empty() {
        return broken(BrokenReason::Invalid(ValidationErrors::new(
            ValidationContext::Load,
            errors,
        )));
    }
    Loaded::Valid(document)
}

impl<D: Document> MetadataStore<D> {
    /// Load the document at `path`; never fails
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = read_document::<D>(&path);
        let errors = match &loaded {
            Loaded::Broken(BrokenMetadata {
                reason: BrokenReason::Invalid(errors),
            }) => errors.clone(),
            _ => ValidationErrors::default(),
        };
        if let Loaded::Broken(b) = &loaded {
            tracing::warn!(
                kind = D::KIND,
                path = %path.display(),
                reason = %b.reason,
                "loaded broken metadata"
            );
        }
        Self {
            path,
            loaded,
            save_points: Vec::new(),
            errors,
        }
    }

    /// Write a new document at `path`, refusing it if save validation fails
    pub fn create(path: impl Into<PathBuf>, document: D) -> Result<Self, StoreError> {
        let mut store = Self {
            path: path.into(),
            loaded: Loaded::Valid(document),
            save_points: Vec::new(),
            errors: ValidationErrors::default(),
        };
        store.save()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loaded(&self) -> &Loaded<D> {
        &self.loaded
    }

    pub fn document(&self) -> Option<&D> {
        self.loaded.document()
    }

    pub fn document_mut(&mut self) -> Option<&mut D> {
        match &mut self.loaded {
            Loaded::Valid(d) => Some(d),
            Loaded::Broken(_) => None,
        }
    }

    pub fn broken(&self) -> Option<&BrokenMetadata> {
        self.loaded.broken()
    }

    pub fn is_broken(&self) -> bool {
        self.loaded.is_broken()
    }

    /// Validate the in-memory document and remember the result for `errors()`
    pub fn validate(&mut self, context: ValidationContext) -> &ValidationErrors {
        self.errors = match &self.loaded {
            Loaded::Valid(d) => ValidationErrors::new(context, d.validate(context)),
            Loaded::Broken(BrokenMetadata {
                reason: BrokenReason::Invalid(errors),
            }) => errors.clone(),
            Loaded::Broken(_) => ValidationErrors::default(),
        };
        &self.errors
    }

    /// Errors from the most recent validation
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn broken_error(&self, broken: &BrokenMetadata) -> StoreError {
        StoreError::Broken {
            kind: D::KIND,
            path: self.path.clone(),
            reason: broken.reason.clone(),
        }
    }

    /// Validate under `Save` and atomically replace the file on success
    pub fn save(&mut self) -> Result<(), StoreError> {
        if let Loaded::Broken(b) = &self.loaded {
            return Err(self.broken_error(b));
        }
        let errors = self.validate(ValidationContext::Save).clone();
        if !errors.is_empty() {
            tracing::warn!(
                kind = D::KIND,
                path = %self.path.display(),
                errors = errors.len(),
                "refusing to save invalid metadata"
            );
            return Err(StoreError::ValidationRefused {
                kind: D::KIND,
                path: self.path.clone(),
                errors,
            });
        }
        let Loaded::Valid(document) = &self.loaded else {
            return Ok(());
        };
        let bytes = document_bytes(document)?;
        write_atomic(&self.path, &bytes).map_err(|e| StoreError::io(&self.path, e))?;
        tracing::debug!(kind = D::KIND, id = document.id(), "saved metadata");
        Ok(())
    }

    /// Discard in-memory edits and save points and re-read from disk
    pub fn reload(&mut self) {
        *self = Self::load(std::mem::take(&mut self.path));
    }

    /// Push a snapshot of the current document
    pub fn save_point(&mut self) {
        self.save_points.push(self.loaded.clone());
    }

    /// Pop the latest snapshot and restore it
    pub fn restore_save_point(&mut self) -> Result<(), StoreError> {
        let snapshot = self.save_points.pop().ok_or(StoreError::NoSavePoint)?;
        self.loaded = snapshot;
        Ok(())
    }

    /// Pop the latest snapshot, keeping current edits
    pub fn release_save_point(&mut self) -> Result<(), StoreError> {
        self.save_points
            .pop()
            .map(|_| ())
            .ok_or(StoreError::NoSavePoint)
    }

    pub fn save_point_depth(&self) -> usize {
        self.save_points.len()
    }

    /// Run `f` inside a save point. Edits survive only if `f` returns
    /// `Ok(SavePoint::Keep(_))`.
    pub fn with_save_point<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<SavePoint<T>, E>,
    {
        let depth = self.open_scope();
        let result = f(self);
        self.close_scope(depth, matches!(result, Ok(SavePoint::Keep(_))));
        result.map(SavePoint::into_value)
    }

    /// Push a save point for a scoped block, returning the depth to close at
    pub(crate) fn open_scope(&mut self) -> usize {
        self.save_point();
        self.save_points.len()
    }

    /// Close the save point opened at `depth`, keeping or restoring edits.
    /// A reload inside the block clears every save point, leaving nothing
    /// to close.
    pub(crate) fn close_scope(&mut self, depth: usize, keep: bool) {
        if self.save_points.len() != depth {
            return;
        }
        match self.save_points.pop() {
            Some(snapshot) if !keep => self.loaded = snapshot,
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
