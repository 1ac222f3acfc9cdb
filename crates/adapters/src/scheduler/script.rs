// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed scheduler adapter

use super::{AdapterError, AdapterOperation, AdapterOutput, SchedulerAdapter};
use async_trait::async_trait;
use bj_core::AdapterConfig;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

pub const JOB_DIR_ENV: &str = "BJ_JOB_DIR";
pub const SCHEDULER_ID_ENV: &str = "BJ_SCHEDULER_ID";
pub const SUBMIT_HOST_ENV: &str = "BJ_SUBMIT_HOST";

/// Runs one configured command per operation.
///
/// A command is split on whitespace into a program and leading arguments;
/// the job directory and, when known, the scheduler id are appended. The
/// child is killed if the call is dropped, so a caller-side timeout never
/// leaves it running.
#[derive(Debug, Clone, Default)]
pub struct ScriptSchedulerAdapter {
    commands: AdapterConfig,
}

impl ScriptSchedulerAdapter {
    pub fn new(commands: AdapterConfig) -> Self {
        Self { commands }
    }

    fn command(&self, op: AdapterOperation) -> Result<&str, AdapterError> {
        let configured = match op {
            AdapterOperation::Submit => &self.commands.submit,
            AdapterOperation::MonitorSingleton => &self.commands.monitor_singleton,
            AdapterOperation::MonitorArray => &self.commands.monitor_array,
            AdapterOperation::Cancel => &self.commands.cancel,
        };
        configured
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AdapterError::NotConfigured(op))
    }

    async fn run(
        &self,
        op: AdapterOperation,
        job_dir: &Path,
        scheduler_id: Option<&str>,
        host: Option<&str>,
    ) -> Result<AdapterOutput, AdapterError> {
        let command = self.command(op)?;
        let mut words = command.split_whitespace();
        let Some(program) = words.next() else {
            return Err(AdapterError::NotConfigured(op));
        };

        let mut cmd = Command::new(program);
        cmd.args(words)
            .arg(job_dir)
            .env(JOB_DIR_ENV, job_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(id) = scheduler_id {
            cmd.arg(id).env(SCHEDULER_ID_ENV, id);
        }
        if let Some(host) = host {
            cmd.env(SUBMIT_HOST_ENV, host);
        }

        let output = cmd.output().await.map_err(|source| AdapterError::Spawn {
            command: command.to_string(),
            source,
        })?;

        Ok(AdapterOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl SchedulerAdapter for ScriptSchedulerAdapter {
    async fn submit(
        &self,
        job_dir: &Path,
        host: Option<&str>,
    ) -> Result<AdapterOutput, AdapterError> {
        self.run(AdapterOperation::Submit, job_dir, None, host)
            .await
    }

    async fn monitor_singleton(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        self.run(
            AdapterOperation::MonitorSingleton,
            job_dir,
            Some(scheduler_id),
            None,
        )
        .await
    }

    async fn monitor_array(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        self.run(
            AdapterOperation::MonitorArray,
            job_dir,
            Some(scheduler_id),
            None,
        )
        .await
    }

    async fn cancel(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        self.run(AdapterOperation::Cancel, job_dir, Some(scheduler_id), None)
            .await
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
