// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listing and lookup of jobs, scripts and templates
//!
//! One unreadable entry never fails a listing: it shows up as BROKEN and is
//! included regardless of the filter.

use crate::job::{Job, METADATA_FILE};
use crate::store::{Loaded, MetadataStore, StoreError};
use bj_core::id::is_valid_id;
use bj_core::{
    Clock, Config, Document, IdGen, JobMetadata, Matcher, ScriptMetadata, TemplateMetadata,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// A loaded script or template
#[derive(Debug, Clone)]
pub struct Record<D: Document> {
    pub id: String,
    pub path: PathBuf,
    pub loaded: Loaded<D>,
}

impl<D: Document> Record<D> {
    pub fn document(&self) -> Option<&D> {
        self.loaded.document()
    }

    pub fn is_broken(&self) -> bool {
        self.loaded.is_broken()
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        match &self.loaded {
            Loaded::Valid(doc) => doc.attributes(),
            Loaded::Broken(_) => BTreeMap::from([("id".to_string(), self.id.clone())]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    jobs_dir: PathBuf,
    scripts_dir: PathBuf,
    templates_dir: PathBuf,
}

/// Sorted entry names under `dir`; a missing directory is empty
fn entry_ids(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };
    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if is_valid_id(name) => ids.push(name.to_string()),
            _ => tracing::debug!(path = %entry.path().display(), "skipping entry"),
        }
    }
    ids.sort();
    Ok(ids)
}

fn load_record<D: Document>(dir: &Path, id: &str) -> Result<Record<D>, StoreError> {
    if !is_valid_id(id) {
        return Err(StoreError::InvalidId {
            kind: D::KIND,
            id: id.to_string(),
        });
    }
    let root = dir.join(id);
    if !root.is_dir() {
        return Err(StoreError::NotFound {
            kind: D::KIND,
            id: id.to_string(),
        });
    }
    let path = root.join(METADATA_FILE);
    let loaded = MetadataStore::<D>::load(&path).loaded().clone();
    Ok(Record {
        id: id.to_string(),
        path,
        loaded,
    })
}

fn list_records<D: Document>(
    dir: &Path,
    matcher: &Matcher,
) -> Result<Vec<Record<D>>, StoreError> {
    let mut records = Vec::new();
    for id in entry_ids(dir)? {
        let record = match load_record::<D>(dir, &id) {
            Ok(record) => record,
            // Removed since the directory was read
            Err(StoreError::NotFound { .. }) => continue,
            Err(e) => return Err(e),
        };
        if record.is_broken() || matcher.matches(&record.attributes()) {
            records.push(record);
        }
    }
    Ok(records)
}

impl Catalog {
    pub fn new(config: &Config) -> Self {
        Self {
            jobs_dir: config.jobs_dir(),
            scripts_dir: config.scripts_dir(),
            templates_dir: config.templates_dir(),
        }
    }

    pub fn jobs_dir(&self) -> &Path {
        &self.jobs_dir
    }

    pub fn job(&self, id: &str) -> Result<Job, StoreError> {
        Job::open(&self.jobs_dir, id)
    }

    /// Jobs whose effective attributes satisfy `matcher`, sorted by id
    pub fn list_jobs(&self, matcher: &Matcher) -> Result<Vec<Job>, StoreError> {
        let mut jobs = Vec::new();
        for id in entry_ids(&self.jobs_dir)? {
            let job = match self.job(&id) {
                Ok(job) => job,
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            if job.is_broken() || matcher.matches(&job.attributes()) {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    pub fn script(&self, id: &str) -> Result<Record<ScriptMetadata>, StoreError> {
        load_record(&self.scripts_dir, id)
    }

    pub fn list_scripts(
        &self,
        matcher: &Matcher,
    ) -> Result<Vec<Record<ScriptMetadata>>, StoreError> {
        list_records(&self.scripts_dir, matcher)
    }

    pub fn template(&self, id: &str) -> Result<Record<TemplateMetadata>, StoreError> {
        load_record(&self.templates_dir, id)
    }

    pub fn list_templates(
        &self,
        matcher: &Matcher,
    ) -> Result<Vec<Record<TemplateMetadata>>, StoreError> {
        list_records(&self.templates_dir, matcher)
    }

    /// Write a script document; used when seeding a data directory
    pub fn add_script(&self, script: ScriptMetadata) -> Result<(), StoreError> {
        add_record(&self.scripts_dir, script)
    }

    pub fn add_template(&self, template: TemplateMetadata) -> Result<(), StoreError> {
        add_record(&self.templates_dir, template)
    }

    /// Create a BOOTSTRAPPING job from a valid script
    pub fn create_job(
        &self,
        script_id: &str,
        answers: BTreeMap<String, Value>,
        id_gen: &impl IdGen,
        clock: &impl Clock,
    ) -> Result<Job, StoreError> {
        let script = self.script(script_id)?;
        if let Loaded::Broken(broken) = &script.loaded {
            return Err(StoreError::Broken {
                kind: ScriptMetadata::KIND,
                path: script.path.clone(),
                reason: broken.reason.clone(),
            });
        }
        let metadata = JobMetadata::new(id_gen.next_job_id(), script_id, answers, clock.now());
        let job = Job::create(&self.jobs_dir, metadata)?;
        tracing::info!(job_id = job.id(), script_id, "created job");
        Ok(job)
    }
}

fn add_record<D: Document>(dir: &Path, document: D) -> Result<(), StoreError> {
    let id = document.id().to_string();
    if !is_valid_id(&id) {
        return Err(StoreError::InvalidId { kind: D::KIND, id });
    }
    MetadataStore::create(dir.join(&id).join(METADATA_FILE), document)?;
    Ok(())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
