// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling driver: settle and monitor every active job

use crate::bootstrap::BootstrapMonitor;
use crate::error::TransitionError;
use crate::monitor::MonitorTransition;
use crate::transition::{TransitionContext, TransitionOutcome};
use bj_adapters::SchedulerAdapter;
use bj_core::Clock;
use bj_storage::{active_job_ids, Job, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One job that could not be polled
#[derive(Debug)]
pub struct PollFailure {
    pub job_id: String,
    pub error: TransitionError,
}

/// Result of one poll tick
#[derive(Debug, Default)]
pub struct PollReport {
    /// Jobs with an active-index marker when the tick started
    pub checked: usize,
    /// Jobs whose type changed, sorted by id
    pub advanced: Vec<(String, TransitionOutcome)>,
    pub failures: Vec<PollFailure>,
}

impl PollReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Bootstrap-check and monitor one job
pub(crate) async fn poll_job<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    jobs_dir: &Path,
    id: &str,
) -> Result<TransitionOutcome, TransitionError> {
    let mut job = Job::open(jobs_dir, id)?;
    let settled = BootstrapMonitor::run(ctx, &mut job)?;
    let monitored = MonitorTransition::run(ctx, &mut job).await?;
    Ok(settled.then(monitored))
}

/// Poll every job with an active-index marker, at most `concurrency` at a
/// time. One job failing never stops the others.
pub(crate) async fn poll<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    jobs_dir: &Path,
    concurrency: usize,
) -> Result<PollReport, TransitionError> {
    let ids = active_job_ids(jobs_dir).map_err(|source| StoreError::Io {
        path: jobs_dir.to_path_buf(),
        source,
    })?;
    tracing::debug!(jobs = ids.len(), concurrency, "poll tick");

    let mut report = PollReport {
        checked: ids.len(),
        ..PollReport::default()
    };
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for id in ids {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let ctx = ctx.clone();
        let dir: PathBuf = jobs_dir.to_path_buf();
        join_set.spawn(async move {
            let _permit = permit;
            let result = poll_job(&ctx, &dir, &id).await;
            (id, result)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((id, Ok(outcome))) => {
                if outcome.is_advanced() {
                    report.advanced.push((id, outcome));
                }
            }
            Ok((job_id, Err(error))) => {
                tracing::warn!(job_id = %job_id, error = %error, "failed to poll job");
                report.failures.push(PollFailure { job_id, error });
            }
            Err(e) => tracing::error!(error = %e, "poll task panicked"),
        }
    }

    report.advanced.sort_by(|a, b| a.0.cmp(&b.0));
    report.failures.sort_by(|a, b| a.job_id.cmp(&b.job_id));
    Ok(report)
}
