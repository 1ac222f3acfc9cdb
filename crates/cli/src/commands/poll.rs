// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll command: one tick, or repeated ticks until Ctrl-C

use crate::commands::job::OutcomeRow;
use crate::error::BjError;
use crate::output::{self, OutputFormat};
use crate::CliEngine;
use bj_engine::{PollReport, TransitionOutcome};
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Args)]
pub struct PollArgs {
    /// Repeat at this interval (e.g. 30s, 5m) until interrupted
    #[arg(long, value_name = "INTERVAL", value_parser = humantime::parse_duration)]
    pub watch: Option<Duration>,
}

#[derive(Serialize)]
struct FailureRow {
    id: String,
    error: String,
}

#[derive(Serialize)]
struct PollSummary {
    checked: usize,
    advanced: Vec<OutcomeRow>,
    failures: Vec<FailureRow>,
}

impl From<&PollReport> for PollSummary {
    fn from(report: &PollReport) -> Self {
        let advanced = report
            .advanced
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                TransitionOutcome::Advanced { to, .. } => Some(OutcomeRow::new(id, *outcome, *to)),
                TransitionOutcome::Unchanged => None,
            })
            .collect();
        let failures = report
            .failures
            .iter()
            .map(|f| FailureRow {
                id: f.job_id.clone(),
                error: f.error.to_string(),
            })
            .collect();
        Self {
            checked: report.checked,
            advanced,
            failures,
        }
    }
}

impl fmt::Display for PollSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.advanced {
            writeln!(f, "{}", row)?;
        }
        for failure in &self.failures {
            writeln!(f, "{}: error: {}", failure.id, failure.error)?;
        }
        writeln!(
            f,
            "polled {} job(s): {} advanced, {} failed",
            self.checked,
            self.advanced.len(),
            self.failures.len()
        )
    }
}

pub async fn handle(engine: &CliEngine, args: PollArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some(interval) = args.watch else {
        let report = engine.poll().await.map_err(BjError::transition)?;
        output::print(&PollSummary::from(&report), format);
        if !report.is_clean() {
            return Err(BjError::poll_failures(report.failures.len()).into());
        }
        return Ok(());
    };

    tracing::info!(interval = %humantime::format_duration(interval), "watching");
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        match engine.poll().await {
            Ok(report) => output::print(&PollSummary::from(&report), format),
            Err(e) => tracing::error!(error = %e, "poll tick failed"),
        }
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    tracing::info!("interrupted; stopping");
    Ok(())
}
