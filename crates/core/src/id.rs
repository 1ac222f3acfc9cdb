// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job ids
//!
//! A job id doubles as the name of the job's directory, so every generator
//! must produce ids that pass [`is_valid_id`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Whether `id` is safe to use as a single directory name. Leading dots are
/// reserved for temporary files.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Source of fresh job ids
pub trait IdGen: Clone + Send + Sync {
    fn next_job_id(&self) -> String;
}

/// Random v4 UUIDs, hyphenated
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_job_id(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// `<prefix>-1`, `<prefix>-2`, ... shared across clones
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: String,
    issued: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl IdGen for SequentialIdGen {
    fn next_job_id(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
