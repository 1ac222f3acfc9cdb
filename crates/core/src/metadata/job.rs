// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job metadata document (schema version 3)

use super::legacy::{JobMetadataV1, JobMetadataV2};
use super::{shape, stored_version, Document, MigrationError};
use crate::job_type::{JobKind, JobType, TaskState};
use crate::validation::{require, require_version, ValidationContext, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of handing a job to the scheduler adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Adapter exit status; zero means the scheduler accepted the job
    pub status: i32,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Structured record of the most recent adapter failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Per-index state of one array task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub index: u32,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Durable state of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub version: u32,
    pub id: String,
    pub script_id: String,
    pub created_at: DateTime<Utc>,
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_kind: Option<JobKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// When the last submit attempt started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitting_since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    /// Array tasks, kept sorted by index
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, Value>,
    /// Keys this version does not recognise, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl JobMetadata {
    /// A freshly created job waiting to be submitted
    pub fn new(
        id: impl Into<String>,
        script_id: impl Into<String>,
        answers: BTreeMap<String, Value>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: <Self as Document>::CURRENT_VERSION,
            id: id.into(),
            script_id: script_id.into(),
            created_at,
            job_type: JobType::Bootstrapping,
            job_kind: None,
            scheduler_id: None,
            scheduler_state: None,
            reason: None,
            start_time: None,
            end_time: None,
            submitting_since: None,
            submission: None,
            diagnostic: None,
            tasks: Vec::new(),
            answers,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.job_type.is_terminal()
    }

    pub fn task(&self, index: u32) -> Option<&TaskMetadata> {
        self.tasks.iter().find(|t| t.index == index)
    }

    /// Insert or replace the task with the same index, keeping index order
    pub fn upsert_task(&mut self, task: TaskMetadata) {
        match self.tasks.binary_search_by_key(&task.index, |t| t.index) {
            Ok(pos) => self.tasks[pos] = task,
            Err(pos) => self.tasks.insert(pos, task),
        }
    }

    /// Lowest index of a task that has not finished
    pub fn first_active_task(&self) -> Option<u32> {
        self.tasks
            .iter()
            .filter(|t| !t.state.is_terminal())
            .map(|t| t.index)
            .min()
    }
}

impl Document for JobMetadata {
    const KIND: &'static str = "job";
    const CURRENT_VERSION: u32 = 3;

    fn from_value(value: Value) -> Result<Self, MigrationError> {
        match stored_version(&value)? {
            1 => {
                let v1: JobMetadataV1 = shape(value, 1)?;
                let v2 = JobMetadataV2::try_from(v1)?;
                Ok(JobMetadata::from(v2))
            }
            2 => {
                let v2: JobMetadataV2 = shape(value, 2)?;
                Ok(JobMetadata::from(v2))
            }
            3 => shape(value, 3),
            found => Err(MigrationError::UnsupportedVersion {
                found,
                current: Self::CURRENT_VERSION,
            }),
        }
    }

    fn validate(&self, context: ValidationContext) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_version(&mut errors, self.version, Self::CURRENT_VERSION);
        require(&mut errors, "id", &self.id);
        require(&mut errors, "script_id", &self.script_id);
        if self.job_type == JobType::Broken {
            errors.push(ValidationError::InvalidValue {
                field: "job_type",
                message: "BROKEN is never stored".to_string(),
            });
        }

        if context == ValidationContext::Load {
            return errors;
        }

        if self.job_type.is_submitted() {
            let because = format!("job_type is {}", self.job_type);
            if self.scheduler_id.as_deref().is_none_or_blank() {
                errors.push(ValidationError::RequiredFor {
                    field: "scheduler_id",
                    because: because.clone(),
                });
            }
            if self.job_kind.is_none() {
                errors.push(ValidationError::RequiredFor {
                    field: "job_kind",
                    because,
                });
            }
        }

        if self.job_type == JobType::FailedSubmission {
            let failed_status = self.submission.as_ref().is_some_and(|s| s.status != 0);
            if !failed_status && self.diagnostic.is_none() {
                errors.push(ValidationError::RequiredFor {
                    field: "diagnostic",
                    because: "job_type is FAILED_SUBMISSION without a failed submission status"
                        .to_string(),
                });
            }
        }

        if self.job_kind == Some(JobKind::Singleton) && !self.tasks.is_empty() {
            errors.push(ValidationError::InvalidValue {
                field: "tasks",
                message: "singleton jobs have no array tasks".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        if self.tasks.iter().any(|t| !seen.insert(t.index)) {
            errors.push(ValidationError::InvalidValue {
                field: "tasks",
                message: "duplicate task index".to_string(),
            });
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                errors.push(ValidationError::InvalidValue {
                    field: "end_time",
                    message: "ends before it starts".to_string(),
                });
            }
        }

        errors
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("id".to_string(), self.id.clone()),
            ("script_id".to_string(), self.script_id.clone()),
            ("job_type".to_string(), self.job_type.to_string()),
            (
                "job_kind".to_string(),
                self.job_kind.map(|k| k.to_string()).unwrap_or_default(),
            ),
            (
                "scheduler_id".to_string(),
                self.scheduler_id.clone().unwrap_or_default(),
            ),
        ])
    }
}

trait BlankExt {
    fn is_none_or_blank(&self) -> bool;
}

impl BlankExt for Option<&str> {
    fn is_none_or_blank(&self) -> bool {
        self.map_or(true, |s| s.trim().is_empty())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
