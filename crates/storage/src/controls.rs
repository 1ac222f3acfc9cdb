// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter-written control files and the effective read view
//!
//! A job's `controls/` directory holds one small file per whitelisted key.
//! Present, non-empty values override the stored metadata in the view only;
//! nothing is folded back into the document unless a transition decides to.

use crate::fs::{remove_if_exists, write_atomic};
use crate::store::Loaded;
use bj_core::{JobKind, JobMetadata, JobType};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const CONTROLS_DIR: &str = "controls";

/// The keys a controls file may override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    SchedulerId,
    SubmitStatus,
    JobType,
    JobKind,
}

impl ControlKey {
    pub const ALL: [ControlKey; 4] = [
        ControlKey::SchedulerId,
        ControlKey::SubmitStatus,
        ControlKey::JobType,
        ControlKey::JobKind,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ControlKey::SchedulerId => "scheduler_id",
            ControlKey::SubmitStatus => "submit_status",
            ControlKey::JobType => "job_type",
            ControlKey::JobKind => "job_kind",
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Parsed control values; `None` means absent, empty, or unparseable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub scheduler_id: Option<String>,
    pub submit_status: Option<i32>,
    pub job_type: Option<JobType>,
    pub job_kind: Option<JobKind>,
}

/// Handle on a job's `controls/` directory
#[derive(Debug, Clone)]
pub struct ControlsDir {
    dir: PathBuf,
}

impl ControlsDir {
    pub fn new(job_dir: &Path) -> Self {
        Self {
            dir: job_dir.join(CONTROLS_DIR),
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: ControlKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn read_raw(&self, key: ControlKey) -> Option<String> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let trimmed = content.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable control file"
                );
                None
            }
        }
    }

    /// Read every whitelisted key; never fails
    pub fn read(&self) -> Controls {
        let scheduler_id = self.read_raw(ControlKey::SchedulerId);
        let submit_status = self
            .read_raw(ControlKey::SubmitStatus)
            .and_then(|raw| parse_control(ControlKey::SubmitStatus, &raw, |s| s.parse().ok()));
        let job_type = self.read_raw(ControlKey::JobType).and_then(|raw| {
            parse_control(ControlKey::JobType, &raw, |s| {
                s.parse::<JobType>().ok().filter(|t| *t != JobType::Broken)
            })
        });
        let job_kind = self
            .read_raw(ControlKey::JobKind)
            .and_then(|raw| parse_control(ControlKey::JobKind, &raw, |s| s.parse().ok()));

        Controls {
            scheduler_id,
            submit_status,
            job_type,
            job_kind,
        }
    }

    /// Atomically replace one control value
    pub fn write(&self, key: ControlKey, value: &str) -> io::Result<()> {
        write_atomic(&self.key_path(key), format!("{}\n", value.trim()).as_bytes())
    }

    pub fn remove(&self, key: ControlKey) -> io::Result<()> {
        remove_if_exists(&self.key_path(key)).map(|_| ())
    }
}

fn parse_control<T>(
    key: ControlKey,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::warn!(key = %key, value = raw, "ignoring unparseable control value");
    }
    parsed
}

/// Read-only merge of stored metadata and controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveView {
    pub job_type: JobType,
    pub job_kind: Option<JobKind>,
    pub scheduler_id: Option<String>,
    pub submit_status: Option<i32>,
    /// Lowest non-terminal array task, when known
    pub active_task: Option<u32>,
    pub broken: bool,
}

impl EffectiveView {
    pub fn is_terminal(&self) -> bool {
        self.job_type.is_terminal()
    }

    /// Content of the active-index marker, or `None` when it must not exist
    pub fn marker_content(&self) -> Option<String> {
        if self.is_terminal() {
            return None;
        }
        Some(match (self.job_kind, self.active_task) {
            (Some(JobKind::Array), Some(index)) => index.to_string(),
            _ => String::new(),
        })
    }
}

/// Overlay `controls` on the stored document. Controls always win; a broken
/// document contributes nothing but its BROKEN state.
pub fn merge(loaded: &Loaded<JobMetadata>, controls: &Controls) -> EffectiveView {
    match loaded {
        Loaded::Broken(_) => EffectiveView {
            job_type: JobType::Broken,
            job_kind: controls.job_kind,
            scheduler_id: controls.scheduler_id.clone(),
            submit_status: controls.submit_status,
            active_task: None,
            broken: true,
        },
        Loaded::Valid(doc) => EffectiveView {
            job_type: controls.job_type.unwrap_or(doc.job_type),
            job_kind: controls.job_kind.or(doc.job_kind),
            scheduler_id: controls
                .scheduler_id
                .clone()
                .or_else(|| doc.scheduler_id.clone()),
            submit_status: controls
                .submit_status
                .or_else(|| doc.submission.as_ref().map(|s| s.status)),
            active_task: doc.first_active_task(),
            broken: false,
        },
    }
}

#[cfg(test)]
#[path = "controls_tests.rs"]
mod tests;
