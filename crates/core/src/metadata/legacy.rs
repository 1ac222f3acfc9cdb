// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Historical job document shapes and the steps between them.
//!
//! v1 -> v2: `state` becomes `job_type`, singleton kind inferred.
//! v2 -> v3: flat `submit_*` fields fold into `submission`.

use super::job::{JobMetadata, Submission};
use super::MigrationError;
use crate::job_type::{JobKind, JobType};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JobMetadataV1 {
    #[serde(default)]
    #[allow(dead_code)]
    pub version: Option<u32>,
    pub id: String,
    pub script_id: String,
    pub created_at: DateTime<Utc>,
    pub state: String,
    #[serde(default)]
    pub scheduler_id: Option<String>,
    #[serde(default)]
    pub submit_status: Option<i32>,
    #[serde(default)]
    pub submit_stdout: Option<String>,
    #[serde(default)]
    pub submit_stderr: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JobMetadataV2 {
    #[allow(dead_code)]
    pub version: u32,
    pub id: String,
    pub script_id: String,
    pub created_at: DateTime<Utc>,
    pub job_type: JobType,
    #[serde(default)]
    pub job_kind: Option<JobKind>,
    #[serde(default)]
    pub scheduler_id: Option<String>,
    #[serde(default)]
    pub submit_status: Option<i32>,
    #[serde(default)]
    pub submit_stdout: Option<String>,
    #[serde(default)]
    pub submit_stderr: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn legacy_state(state: &str) -> Option<JobType> {
    match state.trim().to_ascii_uppercase().as_str() {
        "INITIALIZING" => Some(JobType::Bootstrapping),
        "PENDING" => Some(JobType::Submitted),
        "BROKEN" => None,
        other => other.parse().ok(),
    }
}

impl TryFrom<JobMetadataV1> for JobMetadataV2 {
    type Error = MigrationError;

    fn try_from(v1: JobMetadataV1) -> Result<Self, Self::Error> {
        let job_type =
            legacy_state(&v1.state).ok_or_else(|| MigrationError::UnknownLegacyState {
                version: 1,
                state: v1.state.clone(),
            })?;
        let job_kind = v1.scheduler_id.as_ref().map(|_| JobKind::Singleton);

        Ok(JobMetadataV2 {
            version: 2,
            id: v1.id,
            script_id: v1.script_id,
            created_at: v1.created_at,
            job_type,
            job_kind,
            scheduler_id: v1.scheduler_id,
            submit_status: v1.submit_status,
            submit_stdout: v1.submit_stdout,
            submit_stderr: v1.submit_stderr,
            submitted_at: None,
            answers: v1.answers,
            extra: v1.extra,
        })
    }
}

impl From<JobMetadataV2> for JobMetadata {
    fn from(v2: JobMetadataV2) -> Self {
        let submission = v2.submit_status.map(|status| Submission {
            status,
            stdout: v2.submit_stdout.unwrap_or_default(),
            stderr: v2.submit_stderr.unwrap_or_default(),
            host: None,
            submitted_at: v2.submitted_at.unwrap_or(v2.created_at),
        });

        let mut job = JobMetadata::new(v2.id, v2.script_id, v2.answers, v2.created_at);
        job.job_type = v2.job_type;
        job.job_kind = v2.job_kind;
        job.scheduler_id = v2.scheduler_id;
        job.submission = submission;
        job.extra = v2.extra;
        job
    }
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
