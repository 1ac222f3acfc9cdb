// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active-index marker
//!
//! `active_index` exists in a job directory iff the job's effective state is
//! non-terminal. For array jobs it holds the lowest unfinished task index.

use crate::controls::{merge, ControlsDir};
use crate::fs::{remove_if_exists, write_atomic};
use crate::job::METADATA_FILE;
use crate::store::MetadataStore;
use bj_core::JobMetadata;
use std::io;
use std::path::Path;

pub const ACTIVE_INDEX_FILE: &str = "active_index";

/// Bring the marker in line with what is on disk now. Returns whether the
/// job is active.
pub fn reconcile(job_dir: &Path) -> io::Result<bool> {
    let store = MetadataStore::<JobMetadata>::load(job_dir.join(METADATA_FILE));
    let controls = ControlsDir::new(job_dir).read();
    let view = merge(store.loaded(), &controls);
    let marker = job_dir.join(ACTIVE_INDEX_FILE);

    match view.marker_content() {
        Some(content) => {
            let current = std::fs::read_to_string(&marker).ok();
            if current.as_deref() != Some(content.as_str()) {
                write_atomic(&marker, content.as_bytes())?;
                tracing::debug!(job_dir = %job_dir.display(), content, "marked active");
            }
            Ok(true)
        }
        None => {
            if remove_if_exists(&marker)? {
                tracing::debug!(job_dir = %job_dir.display(), "cleared active marker");
            }
            Ok(false)
        }
    }
}

pub fn is_active(job_dir: &Path) -> bool {
    job_dir.join(ACTIVE_INDEX_FILE).is_file()
}

/// Ids of jobs under `jobs_dir` carrying a marker, sorted
pub fn active_job_ids(jobs_dir: &Path) -> io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(jobs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !name.starts_with('.') && is_active(&entry.path()) {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

#[cfg(test)]
#[path = "active_index_tests.rs"]
mod tests;
