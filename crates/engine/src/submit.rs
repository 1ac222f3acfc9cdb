// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission: BOOTSTRAPPING → SUBMITTING → SUBMITTED or FAILED_SUBMISSION

use crate::error::TransitionError;
use crate::helper::{tail, OUTPUT_TAIL_BYTES};
use crate::transition::{broken_error, commit, finish_time, TransitionContext, TransitionOutcome};
use bj_adapters::{AdapterOperation, SchedulerAdapter};
use bj_core::{Clock, Diagnostic, JobKind, JobType, RemoteHostSelector, Submission};
use bj_storage::Job;
use serde::{Deserialize, Deserializer};
use tracing::Instrument;

/// What a successful submit prints on stdout
#[derive(Debug, Deserialize)]
struct SubmitReply {
    #[serde(deserialize_with = "scalar_string")]
    scheduler_id: String,
    #[serde(default)]
    job_kind: Option<JobKind>,
}

/// Accept `"123"` or `123`
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

pub struct SubmitTransition;

impl SubmitTransition {
    /// Submit a BOOTSTRAPPING job through the adapter.
    ///
    /// Adapter failures are recorded on the job as FAILED_SUBMISSION and
    /// reported as an advanced outcome, not an error.
    pub async fn run<A: SchedulerAdapter, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
    ) -> Result<TransitionOutcome, TransitionError> {
        if job.is_broken() {
            return Err(broken_error(job));
        }
        let from = job.effective().job_type;
        if from != JobType::Bootstrapping {
            return Err(TransitionError::InvalidState {
                job_id: job.id().to_string(),
                job_type: from,
                expected: JobType::Bootstrapping,
            });
        }

        let span = tracing::info_span!("transition.submit", job_id = %job.id());
        submit(ctx, job, from).instrument(span).await
    }
}

async fn submit<A: SchedulerAdapter, C: Clock>(
    ctx: &TransitionContext<A, C>,
    job: &mut Job,
    from: JobType,
) -> Result<TransitionOutcome, TransitionError> {
    let started = ctx.clock.now();
    commit(job, started, |doc| {
        doc.job_type = JobType::Submitting;
        doc.submitting_since = Some(started);
    })?;

    let host = RemoteHostSelector::select(&ctx.submission_hosts).map(str::to_string);
    tracing::info!(host = host.as_deref().unwrap_or("local"), "submitting");

    let job_dir = job.dir().path().to_path_buf();
    let helper = ctx.helper();
    let reply = helper
        .run_json::<SubmitReply, _>(
            AdapterOperation::Submit,
            ctx.adapter.submit(&job_dir, host.as_deref()),
        )
        .await
        .and_then(|(reply, output)| {
            if reply.scheduler_id.trim().is_empty() {
                return Err(helper.diagnostic(
                    AdapterOperation::Submit,
                    Some(&output),
                    false,
                    "adapter submit returned an empty scheduler_id".to_string(),
                ));
            }
            Ok((reply, output))
        });

    job.reload();
    let (reply, output) = match reply {
        Ok(reply) => reply,
        Err(diagnostic) => {
            FailedSubmissionTransition::run(ctx, job, diagnostic, host)?;
            return Ok(TransitionOutcome::between(from, JobType::FailedSubmission));
        }
    };

    let now = ctx.clock.now();
    let scheduler_id = reply.scheduler_id.trim().to_string();
    let kind = reply.job_kind.unwrap_or(JobKind::Singleton);
    tracing::info!(scheduler_id = %scheduler_id, job_kind = %kind, "submitted");
    commit(job, now, |doc| {
        doc.scheduler_id = Some(scheduler_id);
        doc.job_kind = Some(kind);
        doc.submission = Some(Submission {
            status: 0,
            stdout: tail(&output.stdout, OUTPUT_TAIL_BYTES).to_string(),
            stderr: tail(&output.stderr, OUTPUT_TAIL_BYTES).to_string(),
            host,
            submitted_at: now,
        });
        doc.job_type = JobType::Submitted;
    })?;
    Ok(TransitionOutcome::between(from, JobType::Submitted))
}

pub struct FailedSubmissionTransition;

impl FailedSubmissionTransition {
    /// Record `diagnostic` and mark the job FAILED_SUBMISSION
    pub fn run<A, C: Clock>(
        ctx: &TransitionContext<A, C>,
        job: &mut Job,
        diagnostic: Diagnostic,
        host: Option<String>,
    ) -> Result<TransitionOutcome, TransitionError> {
        if job.is_broken() {
            return Err(broken_error(job));
        }
        let from = job.effective().job_type;
        let now = ctx.clock.now();
        tracing::warn!(
            job_id = %job.id(),
            operation = %diagnostic.operation,
            message = diagnostic.message.as_deref().unwrap_or(""),
            "submission failed"
        );

        commit(job, now, |doc| {
            doc.submission = Some(Submission {
                status: diagnostic.exit_code.unwrap_or(-1),
                stdout: diagnostic.stdout.clone(),
                stderr: diagnostic.stderr.clone(),
                host,
                submitted_at: now,
            });
            doc.diagnostic = Some(diagnostic);
            doc.job_type = JobType::FailedSubmission;
            doc.end_time = Some(finish_time(doc, now));
        })?;
        Ok(TransitionOutcome::between(from, JobType::FailedSubmission))
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
