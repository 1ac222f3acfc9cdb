// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job handle: metadata store, controls, and the active-index marker

use crate::active_index::{reconcile, ACTIVE_INDEX_FILE};
use crate::controls::{merge, ControlKey, Controls, ControlsDir, EffectiveView};
use crate::store::{BrokenMetadata, Loaded, MetadataStore, SavePoint, StoreError};
use bj_core::id::is_valid_id;
use bj_core::{Document, JobMetadata, JobType, Submission, ValidationErrors};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";

/// Paths inside one job directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDir {
    root: PathBuf,
}

impl JobDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(ACTIVE_INDEX_FILE)
    }

    pub fn controls(&self) -> ControlsDir {
        ControlsDir::new(&self.root)
    }
}

/// Position in the forward lifecycle; terminal states share the last rank
fn lifecycle_rank(job_type: JobType) -> u8 {
    match job_type {
        JobType::Bootstrapping => 0,
        JobType::Submitting => 1,
        JobType::Submitted => 2,
        JobType::Running => 3,
        _ => 4,
    }
}

/// A job opened from disk
#[derive(Debug)]
pub struct Job {
    id: String,
    dir: JobDir,
    store: MetadataStore<JobMetadata>,
    controls: Controls,
}

impl Job {
    fn validate_id(id: &str) -> Result<(), StoreError> {
        if is_valid_id(id) {
            Ok(())
        } else {
            Err(StoreError::InvalidId {
                kind: JobMetadata::KIND,
                id: id.to_string(),
            })
        }
    }

    /// Open the job `id` under `jobs_dir`.
    ///
    /// Fails only when the directory does not exist; unreadable metadata
    /// yields a BROKEN job. The active-index marker is reconciled on open.
    pub fn open(jobs_dir: &Path, id: &str) -> Result<Self, StoreError> {
        Self::validate_id(id)?;
        let dir = JobDir::new(jobs_dir.join(id));
        if !dir.path().is_dir() {
            return Err(StoreError::NotFound {
                kind: JobMetadata::KIND,
                id: id.to_string(),
            });
        }
        let job = Self {
            id: id.to_string(),
            store: MetadataStore::load(dir.metadata_path()),
            controls: dir.controls().read(),
            dir,
        };
        if let Err(e) = reconcile(job.dir.path()) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to reconcile active index");
        }
        Ok(job)
    }

    /// Write a new job directory for `metadata`
    pub fn create(jobs_dir: &Path, metadata: JobMetadata) -> Result<Self, StoreError> {
        let id = metadata.id.clone();
        Self::validate_id(&id)?;
        let dir = JobDir::new(jobs_dir.join(&id));
        if dir.path().exists() {
            return Err(StoreError::AlreadyExists {
                kind: JobMetadata::KIND,
                id,
            });
        }
        let store = MetadataStore::create(dir.metadata_path(), metadata)?;
        reconcile(dir.path()).map_err(|e| StoreError::io(&dir.marker_path(), e))?;
        Ok(Self {
            id,
            controls: dir.controls().read(),
            dir,
            store,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &JobDir {
        &self.dir
    }

    pub fn loaded(&self) -> &Loaded<JobMetadata> {
        self.store.loaded()
    }

    pub fn metadata(&self) -> Option<&JobMetadata> {
        self.store.document()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut JobMetadata> {
        self.store.document_mut()
    }

    pub fn broken(&self) -> Option<&BrokenMetadata> {
        self.store.broken()
    }

    pub fn is_broken(&self) -> bool {
        self.store.is_broken()
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn errors(&self) -> &ValidationErrors {
        self.store.errors()
    }

    /// Stored document overlaid with controls
    pub fn effective(&self) -> EffectiveView {
        merge(self.store.loaded(), &self.controls)
    }

    /// Stored job type, or BROKEN
    pub fn stored_type(&self) -> JobType {
        self.metadata()
            .map(|m| m.job_type)
            .unwrap_or(JobType::Broken)
    }

    /// Attributes for listing filters, from the effective view
    pub fn attributes(&self) -> BTreeMap<String, String> {
        let view = self.effective();
        let mut attrs = match self.metadata() {
            Some(doc) => doc.attributes(),
            None => BTreeMap::from([
                ("id".to_string(), self.id.clone()),
                ("script_id".to_string(), String::new()),
            ]),
        };
        attrs.insert("job_type".to_string(), view.job_type.to_string());
        attrs.insert(
            "job_kind".to_string(),
            view.job_kind.map(|k| k.to_string()).unwrap_or_default(),
        );
        attrs.insert(
            "scheduler_id".to_string(),
            view.scheduler_id.unwrap_or_default(),
        );
        attrs
    }

    /// Copy current control values into the document. Returns whether the
    /// document changed; a broken job never changes.
    pub fn fold_controls(&mut self, now: DateTime<Utc>) -> bool {
        let controls = self.controls.clone();
        let Some(doc) = self.store.document_mut() else {
            return false;
        };
        let before = doc.clone();

        if let Some(id) = controls.scheduler_id {
            doc.scheduler_id = Some(id);
        }
        if let Some(kind) = controls.job_kind {
            doc.job_kind = Some(kind);
        }
        if let Some(job_type) = controls.job_type {
            doc.job_type = job_type;
        }
        if let Some(status) = controls.submit_status {
            match doc.submission.as_mut() {
                Some(submission) => submission.status = status,
                None => {
                    doc.submission = Some(Submission {
                        status,
                        stdout: String::new(),
                        stderr: String::new(),
                        host: None,
                        submitted_at: now,
                    })
                }
            }
        }

        *doc != before
    }

    /// Validate and atomically write the document, then reconcile the
    /// active-index marker from what is now on disk.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.store.save()?;
        self.retire_superseded_job_type();
        reconcile(self.dir.path()).map_err(|e| StoreError::io(&self.dir.marker_path(), e))?;
        Ok(())
    }

    /// Drop a `job_type` control the stored document has reached or passed
    fn retire_superseded_job_type(&mut self) {
        let (Some(control), Some(doc)) = (self.controls.job_type, self.store.document()) else {
            return;
        };
        if lifecycle_rank(doc.job_type) < lifecycle_rank(control) {
            return;
        }
        match self.dir.controls().remove(ControlKey::JobType) {
            Ok(()) => self.controls.job_type = None,
            Err(e) => {
                tracing::warn!(job_id = %self.id, error = %e, "failed to retire job_type control")
            }
        }
    }

    /// Re-read metadata and controls from disk, dropping in-memory edits
    pub fn reload(&mut self) {
        self.store.reload();
        self.controls = self.dir.controls().read();
    }

    /// Run `f` inside a metadata save point; see
    /// [`MetadataStore::with_save_point`]
    pub fn with_save_point<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<SavePoint<T>, E>,
    {
        let depth = self.store.open_scope();
        let result = f(self);
        self.store.close_scope(depth, matches!(result, Ok(SavePoint::Keep(_))));
        result.map(SavePoint::into_value)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
