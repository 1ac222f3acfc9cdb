// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler adapter
//!
//! Every operation is one subprocess call against the real scheduler. The
//! adapter only reports what happened; interpreting exit codes and output is
//! the engine's job.

mod script;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use script::ScriptSchedulerAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResponse, FakeSchedulerAdapter, SchedulerCall};

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Operations the scheduler adapter performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterOperation {
    Submit,
    MonitorSingleton,
    MonitorArray,
    Cancel,
}

impl AdapterOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterOperation::Submit => "submit",
            AdapterOperation::MonitorSingleton => "monitor_singleton",
            AdapterOperation::MonitorArray => "monitor_array",
            AdapterOperation::Cancel => "cancel",
        }
    }
}

impl fmt::Display for AdapterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an adapter subprocess produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOutput {
    /// Exit code; `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl AdapterOutput {
    /// Exit 0 with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors from invoking the adapter (not from the scheduler itself)
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no adapter command configured for {0}")]
    NotConfigured(AdapterOperation),
    #[error("failed to run adapter command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("job directory does not exist: {}", .0.display())]
    MissingJobDir(PathBuf),
}

/// Adapter for submitting, querying and cancelling scheduler jobs
#[async_trait]
pub trait SchedulerAdapter: Clone + Send + Sync + 'static {
    /// Submit the job in `job_dir`, from `host` when one was selected
    async fn submit(
        &self,
        job_dir: &Path,
        host: Option<&str>,
    ) -> Result<AdapterOutput, AdapterError>;

    /// Query a singleton job's state
    async fn monitor_singleton(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError>;

    /// Query every task of an array job
    async fn monitor_array(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError>;

    async fn cancel(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError>;
}
