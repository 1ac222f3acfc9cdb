// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine facade used by the command line

use crate::bootstrap::BootstrapMonitor;
use crate::cancel::CancelTransition;
use crate::error::TransitionError;
use crate::poller::{self, PollReport};
use crate::submit::SubmitTransition;
use crate::transition::{TransitionContext, TransitionOutcome};
use bj_adapters::{SchedulerAdapter, TracedSchedulerAdapter};
use bj_core::{Clock, Config, IdGen, Matcher};
use bj_storage::{Catalog, Job};
use serde_json::Value;
use std::collections::BTreeMap;

/// Entry point for every job operation.
///
/// Each call opens the job fresh from disk; nothing is cached between
/// calls.
pub struct Engine<A, C, I> {
    catalog: Catalog,
    ctx: TransitionContext<TracedSchedulerAdapter<A>, C>,
    id_gen: I,
    monitor_concurrency: usize,
}

impl<A, C, I> Engine<A, C, I>
where
    A: SchedulerAdapter,
    C: Clock,
    I: IdGen,
{
    pub fn new(config: &Config, adapter: A, clock: C, id_gen: I) -> Self {
        Self {
            catalog: Catalog::new(config),
            ctx: TransitionContext::new(config, TracedSchedulerAdapter::new(adapter), clock),
            id_gen,
            monitor_concurrency: config.monitor_concurrency,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn context(&self) -> &TransitionContext<TracedSchedulerAdapter<A>, C> {
        &self.ctx
    }

    /// Settle a pending bootstrap; a failure here never hides the job
    fn settle(&self, job: &mut Job) {
        if let Err(e) = BootstrapMonitor::run(&self.ctx, job) {
            tracing::warn!(job_id = %job.id(), error = %e, "bootstrap check failed");
            job.reload();
        }
    }

    /// Open a job, settling it if it is still bootstrapping
    pub fn open_job(&self, id: &str) -> Result<Job, TransitionError> {
        let mut job = self.catalog.job(id)?;
        self.settle(&mut job);
        Ok(job)
    }

    /// Jobs matching `matcher` after settling; broken jobs are always listed
    pub fn list_jobs(&self, matcher: &Matcher) -> Result<Vec<Job>, TransitionError> {
        let mut jobs = self.catalog.list_jobs(&Matcher::all())?;
        for job in jobs.iter_mut() {
            self.settle(job);
        }
        jobs.retain(|job| job.is_broken() || matcher.matches(&job.attributes()));
        Ok(jobs)
    }

    pub fn create_job(
        &self,
        script_id: &str,
        answers: BTreeMap<String, Value>,
    ) -> Result<Job, TransitionError> {
        Ok(self
            .catalog
            .create_job(script_id, answers, &self.id_gen, &self.ctx.clock)?)
    }

    pub async fn submit(&self, id: &str) -> Result<TransitionOutcome, TransitionError> {
        let mut job = self.open_job(id)?;
        SubmitTransition::run(&self.ctx, &mut job).await
    }

    /// Settle and monitor one job
    pub async fn monitor(&self, id: &str) -> Result<TransitionOutcome, TransitionError> {
        poller::poll_job(&self.ctx, self.catalog.jobs_dir(), id).await
    }

    pub async fn cancel(&self, id: &str) -> Result<TransitionOutcome, TransitionError> {
        let mut job = self.open_job(id)?;
        CancelTransition::run(&self.ctx, &mut job).await
    }

    /// One polling tick over every active job
    pub async fn poll(&self) -> Result<PollReport, TransitionError> {
        poller::poll(&self.ctx, self.catalog.jobs_dir(), self.monitor_concurrency).await
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
