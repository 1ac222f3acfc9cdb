// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation

use crate::error::TransitionError;
use crate::transition::{broken_error, commit, finish_time, TransitionContext, TransitionOutcome};
use bj_adapters::{AdapterOperation, SchedulerAdapter};
use bj_core::{Clock, JobType, TaskState};
use bj_storage::Job;
use tracing::Instrument;

pub struct CancelTransition;

impl CancelTransition {
    /// Cancel a job on the scheduler, then mark it CANCELLED.
    ///
    /// A terminal job is left alone without calling the adapter; a broken
    /// one is an error. Adapter failure is returned as
    /// [`TransitionError::Adapter`] and changes nothing.
    pub async fn run<A: SchedulerAdapter, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        if job.is_broken() {
            return Err(broken_error(job));
        }
        let view = job.effective();
        if view.is_terminal() {
            return Ok(TransitionOutcome::Unchanged);
        }
        let Some(scheduler_id) = view.scheduler_id else {
            return Err(TransitionError::NotSubmitted {
                job_id: job.id().to_string(),
            });
        };
        let span = tracing::info_span!(
            "transition.cancel",
            job_id = %job.id(),
            scheduler_id = %scheduler_id
        );
        cancel(ctx, job, scheduler_id).instrument(span).await
    }
}

async fn cancel<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    job: &mut Job,
    scheduler_id: String,
) -> Result<TransitionOutcome, TransitionError> {
    let job_dir = job.dir().path().to_path_buf();
    if let Err(diagnostic) = ctx
        .helper()
        .run(
            AdapterOperation::Cancel,
            ctx.adapter.cancel(&job_dir, &scheduler_id),
        )
        .await
    {
        return Err(TransitionError::Adapter {
            job_id: job.id().to_string(),
            diagnostic: Box::new(diagnostic),
        });
    }

    job.reload();
    let view = job.effective();
    if view.is_terminal() {
        tracing::info!(job_type = %view.job_type, "job finished before cancel landed");
        return Ok(TransitionOutcome::Unchanged);
    }
    let from = view.job_type;

    let now = ctx.clock.now();
    commit(job, now, |doc| {
        let end = finish_time(doc, now);
        doc.job_type = JobType::Cancelled;
        doc.end_time = Some(end);
        for task in doc.tasks.iter_mut().filter(|t| !t.state.is_terminal()) {
            task.state = TaskState::Cancelled;
            task.end_time.get_or_insert(end);
        }
    })?;
    tracing::info!(%from, "job cancelled");
    Ok(TransitionOutcome::between(from, JobType::Cancelled))
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
