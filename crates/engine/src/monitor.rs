// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitoring: query the scheduler and fold its answer into the job

use crate::error::TransitionError;
use crate::transition::{broken_error, commit, finish_time, TransitionContext, TransitionOutcome};
use bj_adapters::{AdapterOperation, SchedulerAdapter};
use bj_core::{Clock, Diagnostic, JobKind, JobType, TaskMetadata, TaskState};
use bj_storage::Job;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::Instrument;

/// Singleton monitor stdout
#[derive(Debug, Deserialize)]
struct SingletonReply {
    state: String,
    #[serde(default)]
    scheduler_state: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
}

/// Array monitor stdout
#[derive(Debug, Deserialize)]
struct ArrayReply {
    #[serde(default)]
    tasks: Vec<TaskReply>,
}

#[derive(Debug, Deserialize)]
struct TaskReply {
    index: u32,
    state: String,
    #[serde(default)]
    scheduler_state: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
}

/// Scheduler id of a job the scheduler knows about. A broken job is an
/// error rather than something to skip.
fn monitorable(job: &Job) -> Result<Option<String>, TransitionError> {
    if job.is_broken() {
        return Err(broken_error(job));
    }
    let view = job.effective();
    if !view.job_type.is_submitted() {
        return Ok(None);
    }
    Ok(view.scheduler_id)
}

/// Adapter-reported end time, moved up to `start` when the scheduler's
/// clock puts it earlier
fn clamp_end(start: Option<DateTime<Utc>>, end: DateTime<Utc>) -> DateTime<Utc> {
    start.map_or(end, |start| start.max(end))
}

/// Scheduler word mapped to a task state, with a warning when unknown
fn map_state(job_id: &str, word: &str) -> Option<TaskState> {
    let state = TaskState::from_scheduler_state(word);
    if state.is_none() {
        tracing::warn!(job_id, state = word, "unknown scheduler state; leaving state unchanged");
    }
    state
}

/// Mark the job FAILED after an adapter failure
fn record_failure<A, C: Clock>(
    ctx: &TransitionContext<A, C>,
    job: &mut Job,
    from: JobType,
    diagnostic: Diagnostic,
) -> Result<TransitionOutcome, TransitionError> {
    tracing::warn!(
        job_id = %job.id(),
        operation = %diagnostic.operation,
        message = diagnostic.message.as_deref().unwrap_or(""),
        "monitoring failed"
    );
    let now = ctx.clock.now();
    commit(job, now, |doc| {
        doc.diagnostic = Some(diagnostic);
        doc.job_type = JobType::Failed;
        if doc.end_time.is_none() {
            doc.end_time = Some(finish_time(doc, now));
        }
    })?;
    Ok(TransitionOutcome::between(from, JobType::Failed))
}

/// Monitor a job, dispatching on its kind
pub struct MonitorTransition;

impl MonitorTransition {
    pub async fn run<A: SchedulerAdapter, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        match job.effective().job_kind {
            Some(JobKind::Array) => MonitorArrayTransition::run(ctx, job).await,
            _ => MonitorSingletonTransition::run(ctx, job).await,
        }
    }
}

pub struct MonitorSingletonTransition;

impl MonitorSingletonTransition {
    /// Only SUBMITTED/RUNNING jobs with a scheduler id are queried; anything
    /// else is unchanged. A broken job is [`TransitionError::Broken`].
    pub async fn run<A: SchedulerAdapter, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        let Some(scheduler_id) = monitorable(job)? else {
            return Ok(TransitionOutcome::Unchanged);
        };
        let span = tracing::info_span!(
            "transition.monitor_singleton",
            job_id = %job.id(),
            scheduler_id = %scheduler_id
        );
        monitor_singleton(ctx, job, scheduler_id)
            .instrument(span)
            .await
    }
}

async fn monitor_singleton<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    job: &mut Job,
    scheduler_id: String,
) -> Result<TransitionOutcome, TransitionError> {
    let job_dir = job.dir().path().to_path_buf();
    let reply = ctx
        .helper()
        .run_json::<SingletonReply, _>(
            AdapterOperation::MonitorSingleton,
            ctx.adapter.monitor_singleton(&job_dir, &scheduler_id),
        )
        .await;

    job.reload();
    let view = job.effective();
    if view.is_terminal() {
        tracing::debug!(job_type = %view.job_type, "job finished meanwhile");
        return Ok(TransitionOutcome::Unchanged);
    }
    let from = view.job_type;

    let reply = match reply {
        Ok((reply, _)) => reply,
        Err(diagnostic) => return record_failure(ctx, job, from, diagnostic),
    };

    let state = map_state(job.id(), &reply.state);
    let now = ctx.clock.now();
    let mut to = from;
    commit(job, now, |doc| {
        if doc.job_kind.is_none() {
            doc.job_kind = Some(JobKind::Singleton);
        }
        doc.scheduler_state = Some(reply.scheduler_state.unwrap_or(reply.state));
        if reply.reason.is_some() {
            doc.reason = reply.reason;
        }
        if reply.start_time.is_some() {
            doc.start_time = reply.start_time;
        }
        if let Some(end) = reply.end_time {
            doc.end_time = Some(clamp_end(doc.start_time, end));
        }
        if let Some(state) = state {
            doc.job_type = JobType::from(state);
            if state == TaskState::Running && doc.start_time.is_none() {
                doc.start_time = Some(doc.end_time.map_or(now, |end| end.min(now)));
            }
            if state.is_terminal() && doc.end_time.is_none() {
                doc.end_time = Some(finish_time(doc, now));
            }
        }
        to = doc.job_type;
    })?;

    let outcome = TransitionOutcome::between(from, to);
    if outcome.is_advanced() {
        tracing::info!(%from, %to, "job advanced");
    }
    Ok(outcome)
}

pub struct MonitorArrayTransition;

impl MonitorArrayTransition {
    /// Update per-task records and recompute the job type from them
    pub async fn run<A: SchedulerAdapter, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        let Some(scheduler_id) = monitorable(job)? else {
            return Ok(TransitionOutcome::Unchanged);
        };
        let span = tracing::info_span!(
            "transition.monitor_array",
            job_id = %job.id(),
            scheduler_id = %scheduler_id
        );
        monitor_array(ctx, job, scheduler_id).instrument(span).await
    }
}

async fn monitor_array<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    job: &mut Job,
    scheduler_id: String,
) -> Result<TransitionOutcome, TransitionError> {
    let job_dir = job.dir().path().to_path_buf();
    let reply = ctx
        .helper()
        .run_json::<ArrayReply, _>(
            AdapterOperation::MonitorArray,
            ctx.adapter.monitor_array(&job_dir, &scheduler_id),
        )
        .await;

    job.reload();
    let view = job.effective();
    if view.is_terminal() {
        tracing::debug!(job_type = %view.job_type, "job finished meanwhile");
        return Ok(TransitionOutcome::Unchanged);
    }
    let from = view.job_type;

    let reply = match reply {
        Ok((reply, _)) => reply,
        Err(diagnostic) => return record_failure(ctx, job, from, diagnostic),
    };
    if reply.tasks.is_empty() {
        tracing::debug!("no tasks reported");
        return Ok(TransitionOutcome::Unchanged);
    }

    let job_id = job.id().to_string();
    let now = ctx.clock.now();
    let mut to = from;
    commit(job, now, |doc| {
        if doc.job_kind.is_none() {
            doc.job_kind = Some(JobKind::Array);
        }
        for reported in reply.tasks {
            let mapped = map_state(&job_id, &reported.state);
            let mut task = doc.task(reported.index).cloned().unwrap_or(TaskMetadata {
                index: reported.index,
                state: TaskState::Pending,
                scheduler_state: None,
                reason: None,
                start_time: None,
                end_time: None,
            });
            if let Some(state) = mapped {
                task.state = state;
            }
            task.scheduler_state = Some(reported.scheduler_state.unwrap_or(reported.state));
            if reported.reason.is_some() {
                task.reason = reported.reason;
            }
            if reported.start_time.is_some() {
                task.start_time = reported.start_time;
            }
            if let Some(end) = reported.end_time {
                task.end_time = Some(clamp_end(task.start_time, end));
            }
            doc.upsert_task(task);
        }

        if let Some(job_type) = JobType::aggregate(doc.tasks.iter().map(|t| t.state)) {
            doc.job_type = job_type;
        }
        if doc.start_time.is_none() {
            doc.start_time = doc.tasks.iter().filter_map(|t| t.start_time).min();
        }
        if doc.job_type.is_terminal() && doc.end_time.is_none() {
            let last = doc.tasks.iter().filter_map(|t| t.end_time).max();
            doc.end_time = Some(finish_time(doc, last.unwrap_or(now)));
        }
        to = doc.job_type;
    })?;

    let outcome = TransitionOutcome::between(from, to);
    if outcome.is_advanced() {
        tracing::info!(%from, %to, "array job advanced");
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
