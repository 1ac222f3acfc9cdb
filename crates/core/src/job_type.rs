// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and task state vocabularies
//!
//! `JobType` is the closed set a job's lifecycle moves through. Terminal
//! states never transition further; `Broken` is synthetic and only ever
//! exists in memory for documents that could not be trusted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Bootstrapping,
    Submitting,
    Submitted,
    Running,
    Completed,
    Cancelled,
    Failed,
    FailedSubmission,
    Broken,
}

impl JobType {
    pub const ALL: [JobType; 9] = [
        JobType::Bootstrapping,
        JobType::Submitting,
        JobType::Submitted,
        JobType::Running,
        JobType::Completed,
        JobType::Cancelled,
        JobType::Failed,
        JobType::FailedSubmission,
        JobType::Broken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Bootstrapping => "BOOTSTRAPPING",
            JobType::Submitting => "SUBMITTING",
            JobType::Submitted => "SUBMITTED",
            JobType::Running => "RUNNING",
            JobType::Completed => "COMPLETED",
            JobType::Cancelled => "CANCELLED",
            JobType::Failed => "FAILED",
            JobType::FailedSubmission => "FAILED_SUBMISSION",
            JobType::Broken => "BROKEN",
        }
    }

    /// Terminal states never transition further
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobType::Completed
                | JobType::Cancelled
                | JobType::Failed
                | JobType::FailedSubmission
                | JobType::Broken
        )
    }

    /// States in which the scheduler knows about the job
    pub fn is_submitted(&self) -> bool {
        matches!(self, JobType::Submitted | JobType::Running)
    }

    /// Effective job state of an array job given its task states.
    ///
    /// Any non-terminal task keeps the job non-terminal (RUNNING if a task
    /// runs, SUBMITTED otherwise). Once every task is terminal the worst
    /// outcome wins: FAILED > CANCELLED > COMPLETED. Returns `None` when
    /// there are no tasks.
    pub fn aggregate<I>(tasks: I) -> Option<JobType>
    where
        I: IntoIterator<Item = TaskState>,
    {
        let mut any = false;
        let mut any_running = false;
        let mut any_pending = false;
        let mut worst: Option<TaskState> = None;

        for state in tasks {
            any = true;
            match state {
                TaskState::Pending => any_pending = true,
                TaskState::Running => any_running = true,
                terminal => {
                    if worst.map_or(true, |w| terminal.severity() > w.severity()) {
                        worst = Some(terminal);
                    }
                }
            }
        }

        if !any {
            return None;
        }
        if any_running {
            return Some(JobType::Running);
        }
        if any_pending {
            return Some(JobType::Submitted);
        }
        worst.map(JobType::from)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown job type: {}", s.trim()))
    }
}

impl From<TaskState> for JobType {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Pending => JobType::Submitted,
            TaskState::Running => JobType::Running,
            TaskState::Completed => JobType::Completed,
            TaskState::Failed => JobType::Failed,
            TaskState::Cancelled => JobType::Cancelled,
        }
    }
}

/// Whether a job is a single task or an array of tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    Singleton,
    Array,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Singleton => "SINGLETON",
            JobKind::Array => "ARRAY",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLETON" => Ok(JobKind::Singleton),
            "ARRAY" => Ok(JobKind::Array),
            other => Err(format!("unknown job kind: {}", other)),
        }
    }
}

/// Scheduler-derived state of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled
        )
    }

    /// Map a scheduler adapter's state word onto the task vocabulary.
    ///
    /// Returns `None` for `UNKNOWN` and anything unrecognised.
    pub fn from_scheduler_state(word: &str) -> Option<TaskState> {
        let normalized = word.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "PENDING" | "QUEUED" | "CONFIGURING" => Some(TaskState::Pending),
            "RUNNING" | "COMPLETING" => Some(TaskState::Running),
            "COMPLETED" => Some(TaskState::Completed),
            "FAILED" | "TIMEOUT" | "OUT_OF_MEMORY" | "NODE_FAIL" | "BOOT_FAIL" => {
                Some(TaskState::Failed)
            }
            "CANCELLED" => Some(TaskState::Cancelled),
            _ => None,
        }
    }

    fn severity(&self) -> u8 {
        match self {
            TaskState::Pending | TaskState::Running => 0,
            TaskState::Completed => 1,
            TaskState::Cancelled => 2,
            TaskState::Failed => 3,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "PENDING",
            TaskState::Running => "RUNNING",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
            TaskState::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "job_type_tests.rs"]
mod tests;
