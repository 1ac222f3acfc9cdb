// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settles jobs left in BOOTSTRAPPING or SUBMITTING
//!
//! A submitting process may die after the adapter ran but before metadata
//! was written. The adapter's controls files are the only record of what
//! happened; this reads them and moves the job forward. Without evidence, a
//! job that waits too long fails its submission.

use crate::error::TransitionError;
use crate::submit::FailedSubmissionTransition;
use crate::transition::{commit, TransitionContext, TransitionOutcome};
use bj_adapters::AdapterOperation;
use bj_core::{Clock, JobKind, JobType};
use bj_storage::Job;

pub struct BootstrapMonitor;

impl BootstrapMonitor {
    /// Act on adapter evidence for a job stored as BOOTSTRAPPING or
    /// SUBMITTING, or whose effective type is BOOTSTRAPPING. Idempotent; any
    /// other job is unchanged.
    pub fn run<A, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        let Some(doc) = job.metadata() else {
            return Ok(TransitionOutcome::Unchanged);
        };
        let stored = doc.job_type;
        let created_at = doc.created_at;
        let submitting_since = doc.submitting_since;
        let view = job.effective();
        let unsettled = matches!(stored, JobType::Bootstrapping | JobType::Submitting);
        if !unsettled && view.job_type != JobType::Bootstrapping {
            return Ok(TransitionOutcome::Unchanged);
        }

        let span = tracing::info_span!("transition.bootstrap", job_id = %job.id());
        let _guard = span.enter();

        let controls = job.controls().clone();
        let now = ctx.clock.now();

        match (controls.submit_status, controls.scheduler_id.as_deref()) {
            (Some(0), Some(scheduler_id)) => {
                let target = match controls.job_type {
                    Some(t) if t != JobType::Bootstrapping && t != JobType::Submitting => t,
                    _ => JobType::Submitted,
                };
                tracing::info!(scheduler_id, to = %target, "adapter confirmed submission");
                commit(job, now, |doc| {
                    doc.job_type = target;
                    if doc.job_kind.is_none() {
                        doc.job_kind = Some(JobKind::Singleton);
                    }
                })?;
                return Ok(TransitionOutcome::between(stored, target));
            }
            (Some(status), _) if status != 0 => {
                let mut diagnostic = ctx.helper().diagnostic(
                    AdapterOperation::Submit,
                    None,
                    false,
                    format!("adapter reported submit status {}", status),
                );
                diagnostic.exit_code = Some(status);
                FailedSubmissionTransition::run(ctx, job, diagnostic, None)?;
                return Ok(TransitionOutcome::between(stored, JobType::FailedSubmission));
            }
            _ => {}
        }

        if stored == JobType::Bootstrapping && controls.job_type == Some(JobType::Submitting) {
            tracing::info!("adapter is submitting");
            commit(job, now, |doc| {
                doc.submitting_since = Some(now);
            })?;
            return Ok(TransitionOutcome::between(stored, JobType::Submitting));
        }

        // A submit gets its adapter call plus the bootstrap allowance
        let (phase, since, limit) = match (stored, view.job_type) {
            (JobType::Bootstrapping, JobType::Bootstrapping) => {
                ("bootstrap", created_at, ctx.bootstrap_timeout)
            }
            (JobType::Submitting, JobType::Submitting) => (
                "submission",
                submitting_since.unwrap_or(created_at),
                ctx.adapter_timeout + ctx.bootstrap_timeout,
            ),
            _ => return Ok(TransitionOutcome::Unchanged),
        };
        let timed_out = now
            .signed_duration_since(since)
            .to_std()
            .is_ok_and(|age| age > limit);
        if !timed_out {
            return Ok(TransitionOutcome::Unchanged);
        }

        let diagnostic = ctx.helper().diagnostic(
            AdapterOperation::Submit,
            None,
            true,
            format!(
                "{} timed out after {}",
                phase,
                humantime::format_duration(limit)
            ),
        );
        FailedSubmissionTransition::run(ctx, job, diagnostic, None)?;
        Ok(TransitionOutcome::between(stored, JobType::FailedSubmission))
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
