// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake scheduler adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AdapterError, AdapterOperation, AdapterOutput, SchedulerAdapter};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recorded scheduler call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    Submit {
        job_dir: PathBuf,
        host: Option<String>,
    },
    MonitorSingleton {
        job_dir: PathBuf,
        scheduler_id: String,
    },
    MonitorArray {
        job_dir: PathBuf,
        scheduler_id: String,
    },
    Cancel {
        job_dir: PathBuf,
        scheduler_id: String,
    },
}

impl SchedulerCall {
    pub fn operation(&self) -> AdapterOperation {
        match self {
            SchedulerCall::Submit { .. } => AdapterOperation::Submit,
            SchedulerCall::MonitorSingleton { .. } => AdapterOperation::MonitorSingleton,
            SchedulerCall::MonitorArray { .. } => AdapterOperation::MonitorArray,
            SchedulerCall::Cancel { .. } => AdapterOperation::Cancel,
        }
    }
}

/// Scripted reply to one call
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Output(AdapterOutput),
    /// Fail to start the process
    SpawnError(String),
    /// Never complete; for timeout tests
    Hang,
}

#[derive(Default)]
struct FakeState {
    responses: HashMap<AdapterOperation, VecDeque<FakeResponse>>,
    calls: Vec<SchedulerCall>,
}

/// Fake scheduler adapter for testing.
///
/// Responses are queued per operation and consumed in order. An operation
/// with nothing queued behaves like an unconfigured command.
#[derive(Clone, Default)]
pub struct FakeSchedulerAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeSchedulerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, op: AdapterOperation, response: FakeResponse) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .entry(op)
            .or_default()
            .push_back(response);
    }

    /// Queue a successful call printing `stdout`
    pub fn push_output(&self, op: AdapterOperation, stdout: impl Into<String>) {
        self.push(op, FakeResponse::Output(AdapterOutput::success(stdout)));
    }

    /// Queue a call exiting with `exit_code`
    pub fn push_failure(&self, op: AdapterOperation, exit_code: i32, stderr: impl Into<String>) {
        self.push(
            op,
            FakeResponse::Output(AdapterOutput::failure(exit_code, stderr)),
        );
    }

    pub fn push_hang(&self, op: AdapterOperation) {
        self.push(op, FakeResponse::Hang);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Recorded calls of one operation
    pub fn calls_for(&self, op: AdapterOperation) -> Vec<SchedulerCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation() == op)
            .collect()
    }

    async fn reply(
        &self,
        op: AdapterOperation,
        call: SchedulerCall,
    ) -> Result<AdapterOutput, AdapterError> {
        let response = {
            let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(call);
            state.responses.get_mut(&op).and_then(VecDeque::pop_front)
        };
        match response {
            Some(FakeResponse::Output(output)) => Ok(output),
            Some(FakeResponse::SpawnError(message)) => Err(AdapterError::Spawn {
                command: format!("fake {}", op),
                source: std::io::Error::other(message),
            }),
            Some(FakeResponse::Hang) => std::future::pending().await,
            None => Err(AdapterError::NotConfigured(op)),
        }
    }
}

#[async_trait]
impl SchedulerAdapter for FakeSchedulerAdapter {
    async fn submit(
        &self,
        job_dir: &Path,
        host: Option<&str>,
    ) -> Result<AdapterOutput, AdapterError> {
        let call = SchedulerCall::Submit {
            job_dir: job_dir.to_path_buf(),
            host: host.map(str::to_string),
        };
        self.reply(AdapterOperation::Submit, call).await
    }

    async fn monitor_singleton(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let call = SchedulerCall::MonitorSingleton {
            job_dir: job_dir.to_path_buf(),
            scheduler_id: scheduler_id.to_string(),
        };
        self.reply(AdapterOperation::MonitorSingleton, call).await
    }

    async fn monitor_array(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let call = SchedulerCall::MonitorArray {
            job_dir: job_dir.to_path_buf(),
            scheduler_id: scheduler_id.to_string(),
        };
        self.reply(AdapterOperation::MonitorArray, call).await
    }

    async fn cancel(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let call = SchedulerCall::Cancel {
            job_dir: job_dir.to_path_buf(),
            scheduler_id: scheduler_id.to_string(),
        };
        self.reply(AdapterOperation::Cancel, call).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
