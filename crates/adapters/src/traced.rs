// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::scheduler::{AdapterError, AdapterOutput, SchedulerAdapter};
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any SchedulerAdapter
#[derive(Clone)]
pub struct TracedSchedulerAdapter<A> {
    inner: A,
}

impl<A> TracedSchedulerAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

/// Precondition: the job directory must exist before any adapter runs
fn check_job_dir(job_dir: &Path) -> Result<(), AdapterError> {
    if job_dir.is_dir() {
        return Ok(());
    }
    tracing::error!("job directory does not exist");
    Err(AdapterError::MissingJobDir(job_dir.to_path_buf()))
}

/// Await an adapter call and log its outcome with timing
async fn observe<F>(call: F) -> Result<AdapterOutput, AdapterError>
where
    F: Future<Output = Result<AdapterOutput, AdapterError>>,
{
    let start = std::time::Instant::now();
    let result = call.await;
    let elapsed = start.elapsed();

    match &result {
        Ok(output) if output.is_success() => tracing::info!(
            exit_code = output.exit_code,
            stdout_len = output.stdout.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "adapter call completed"
        ),
        Ok(output) => tracing::warn!(
            exit_code = output.exit_code,
            stderr_len = output.stderr.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "adapter reported failure"
        ),
        Err(e) => tracing::error!(
            elapsed_ms = elapsed.as_millis() as u64,
            error = %e,
            "adapter call failed"
        ),
    }

    result
}

#[async_trait]
impl<A: SchedulerAdapter> SchedulerAdapter for TracedSchedulerAdapter<A> {
    async fn submit(
        &self,
        job_dir: &Path,
        host: Option<&str>,
    ) -> Result<AdapterOutput, AdapterError> {
        let span = tracing::info_span!("adapter.submit", job_dir = %job_dir.display(), host);
        async {
            tracing::info!("starting");
            check_job_dir(job_dir)?;
            observe(self.inner.submit(job_dir, host)).await
        }
        .instrument(span)
        .await
    }

    async fn monitor_singleton(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let span = tracing::info_span!(
            "adapter.monitor_singleton",
            job_dir = %job_dir.display(),
            scheduler_id
        );
        async {
            tracing::debug!("starting");
            check_job_dir(job_dir)?;
            observe(self.inner.monitor_singleton(job_dir, scheduler_id)).await
        }
        .instrument(span)
        .await
    }

    async fn monitor_array(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let span = tracing::info_span!(
            "adapter.monitor_array",
            job_dir = %job_dir.display(),
            scheduler_id
        );
        async {
            tracing::debug!("starting");
            check_job_dir(job_dir)?;
            observe(self.inner.monitor_array(job_dir, scheduler_id)).await
        }
        .instrument(span)
        .await
    }

    async fn cancel(
        &self,
        job_dir: &Path,
        scheduler_id: &str,
    ) -> Result<AdapterOutput, AdapterError> {
        let span =
            tracing::info_span!("adapter.cancel", job_dir = %job_dir.display(), scheduler_id);
        async {
            tracing::info!("starting");
            check_job_dir(job_dir)?;
            observe(self.inner.cancel(job_dir, scheduler_id)).await
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
