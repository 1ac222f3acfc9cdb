// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared pieces of every transition

use crate::error::TransitionError;
use crate::helper::JobTransitionHelper;
use bj_adapters::SchedulerAdapter;
use bj_core::{Clock, Config, JobMetadata, JobType};
use bj_storage::{Job, SavePoint};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// What a transition did to the job's type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Unchanged,
    Advanced { from: JobType, to: JobType },
}

impl TransitionOutcome {
    pub fn between(from: JobType, to: JobType) -> Self {
        if from == to {
            TransitionOutcome::Unchanged
        } else {
            TransitionOutcome::Advanced { from, to }
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, TransitionOutcome::Advanced { .. })
    }

    /// Combine with a transition that ran after this one
    pub fn then(self, next: TransitionOutcome) -> TransitionOutcome {
        match (self, next) {
            (TransitionOutcome::Advanced { from, .. }, TransitionOutcome::Advanced { to, .. }) => {
                TransitionOutcome::between(from, to)
            }
            (TransitionOutcome::Unchanged, next) => next,
            (this, TransitionOutcome::Unchanged) => this,
        }
    }
}

impl fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionOutcome::Unchanged => f.write_str("unchanged"),
            TransitionOutcome::Advanced { from, to } => write!(f, "{} -> {}", from, to),
        }
    }
}

/// Dependencies shared by all transitions
#[derive(Clone)]
pub struct TransitionContext<A, C> {
    pub(crate) adapter: A,
    pub(crate) clock: C,
    pub(crate) adapter_timeout: Duration,
    pub(crate) bootstrap_timeout: Duration,
    pub(crate) submission_hosts: Vec<String>,
}

impl<A: SchedulerAdapter, C: Clock> TransitionContext<A, C> {
    pub fn new(config: &Config, adapter: A, clock: C) -> Self {
        Self {
            adapter,
            clock,
            adapter_timeout: config.adapter_timeout,
            bootstrap_timeout: config.bootstrap_timeout,
            submission_hosts: config.submission_hosts.clone(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A, C: Clock> TransitionContext<A, C> {
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn helper(&self) -> JobTransitionHelper<'_, C> {
        JobTransitionHelper::new(&self.clock, self.adapter_timeout)
    }
}

pub(crate) fn broken_error(job: &Job) -> TransitionError {
    TransitionError::Broken {
        job_id: job.id().to_string(),
        reason: job
            .broken()
            .map(|b| b.reason.to_string())
            .unwrap_or_default(),
    }
}

/// End time for a job finishing at `now`; never before its start
pub(crate) fn finish_time(doc: &JobMetadata, now: DateTime<Utc>) -> DateTime<Utc> {
    doc.start_time.map_or(now, |start| start.max(now))
}

/// Fold controls, apply `edit`, and save, all inside a save point.
///
/// Returns whether anything was written. A refused save leaves the
/// in-memory document as it was before the call.
pub(crate) fn commit<F>(job: &mut Job, now: DateTime<Utc>, edit: F) -> Result<bool, TransitionError>
where
    F: FnOnce(&mut JobMetadata),
{
    job.with_save_point(|job| {
        let before = job.metadata().cloned();
        job.fold_controls(now);
        let Some(doc) = job.metadata_mut() else {
            return Err(broken_error(job));
        };
        edit(doc);
        if job.metadata() == before.as_ref() {
            return Ok(SavePoint::Discard(false));
        }
        job.save()?;
        Ok(SavePoint::Keep(true))
    })
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
