// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job commands

use crate::error::BjError;
use crate::output::{self, cell, OutputFormat};
use crate::CliEngine;
use bj_core::{JobMetadata, JobType};
use bj_engine::TransitionOutcome;
use bj_storage::Job;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// List jobs, optionally filtered by attribute
    List {
        /// Attribute filter KEY=PATTERN[,PATTERN...]; repeat to require more keys
        #[arg(long = "filter", short = 'f', value_name = "KEY=PATTERNS")]
        filters: Vec<String>,
    },
    /// Show details of a job
    Show {
        /// Job id
        id: String,
    },
    /// Create a job from a script
    Create {
        /// Script id
        script_id: String,
        /// Answer KEY=VALUE; VALUE is parsed as JSON, else taken as a string
        #[arg(long = "answer", short = 'a', value_name = "KEY=VALUE", value_parser = parse_answer)]
        answers: Vec<(String, Value)>,
    },
    /// Submit a BOOTSTRAPPING job to the scheduler
    Submit {
        /// Job id
        id: String,
    },
    /// Query the scheduler once and update the job
    Monitor {
        /// Job id
        id: String,
    },
    /// Cancel a job on the scheduler
    Cancel {
        /// Job id
        id: String,
    },
}

pub(crate) fn parse_answer(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty answer key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// One line of `bj job list`
#[derive(Debug, Serialize)]
pub(crate) struct JobRow {
    id: String,
    job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduler_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    broken: Option<String>,
}

pub(crate) fn job_header() -> String {
    format!(
        "{:<38} {:<18} {:<10} {:<12} {}",
        "ID", "TYPE", "KIND", "SCHEDULER_ID", "SCRIPT"
    )
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        let view = job.effective();
        Self {
            id: job.id().to_string(),
            job_type: view.job_type,
            job_kind: view.job_kind.map(|k| k.to_string()),
            scheduler_id: view.scheduler_id,
            script_id: job.metadata().map(|m| m.script_id.clone()),
            broken: job.broken().map(|b| b.reason.to_string()),
        }
    }
}

impl fmt::Display for JobRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<38} {:<18} {:<10} {:<12} {}",
            self.id,
            self.job_type.as_str(),
            cell(self.job_kind.as_deref()),
            cell(self.scheduler_id.as_deref()),
            cell(self.script_id.as_deref()),
        )
    }
}

/// `bj job show`
#[derive(Debug, Serialize)]
pub(crate) struct JobDetail {
    id: String,
    job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduler_id: Option<String>,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    broken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<JobMetadata>,
}

impl From<&Job> for JobDetail {
    fn from(job: &Job) -> Self {
        let view = job.effective();
        Self {
            id: job.id().to_string(),
            job_type: view.job_type,
            job_kind: view.job_kind.map(|k| k.to_string()),
            scheduler_id: view.scheduler_id,
            active: job.dir().marker_path().exists(),
            broken: job.broken().map(|b| b.reason.to_string()),
            metadata: job.metadata().cloned(),
        }
    }
}

impl fmt::Display for JobDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job: {}", self.id)?;
        match &self.metadata {
            Some(doc) if doc.job_type != self.job_type => {
                writeln!(f, "  Type: {} (stored {})", self.job_type, doc.job_type)?
            }
            _ => writeln!(f, "  Type: {}", self.job_type)?,
        }
        if let Some(reason) = &self.broken {
            writeln!(f, "  Broken: {}", reason)?;
        }
        if let Some(kind) = &self.job_kind {
            writeln!(f, "  Kind: {}", kind)?;
        }
        if let Some(id) = &self.scheduler_id {
            writeln!(f, "  Scheduler id: {}", id)?;
        }
        let Some(doc) = &self.metadata else {
            return Ok(());
        };
        writeln!(f, "  Script: {}", doc.script_id)?;
        writeln!(f, "  Created: {}", doc.created_at.to_rfc3339())?;
        if let Some(state) = &doc.scheduler_state {
            writeln!(f, "  Scheduler state: {}", state)?;
        }
        if let Some(reason) = &doc.reason {
            writeln!(f, "  Reason: {}", reason)?;
        }
        if let Some(start) = doc.start_time {
            writeln!(f, "  Started: {}", start.to_rfc3339())?;
        }
        if let Some(end) = doc.end_time {
            writeln!(f, "  Ended: {}", end.to_rfc3339())?;
        }
        if let Some(submission) = &doc.submission {
            write!(f, "  Submission: status {}", submission.status)?;
            if let Some(host) = &submission.host {
                write!(f, " via {}", host)?;
            }
            writeln!(f, " at {}", submission.submitted_at.to_rfc3339())?;
        }
        if let Some(diagnostic) = &doc.diagnostic {
            writeln!(
                f,
                "  Diagnostic: {} {}",
                diagnostic.operation,
                diagnostic.message.as_deref().unwrap_or("failed")
            )?;
        }
        if !doc.tasks.is_empty() {
            writeln!(f, "  Tasks:")?;
            for task in &doc.tasks {
                writeln!(
                    f,
                    "    {:<6} {:<10} {}",
                    task.index,
                    task.state,
                    cell(task.scheduler_state.as_deref())
                )?;
            }
        }
        if !doc.answers.is_empty() {
            writeln!(f, "  Answers:")?;
            for (key, value) in &doc.answers {
                writeln!(f, "    {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// Result of submit, monitor or cancel
#[derive(Debug, Serialize)]
pub(crate) struct OutcomeRow {
    pub id: String,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<JobType>,
    pub job_type: JobType,
}

impl OutcomeRow {
    pub fn new(id: &str, outcome: TransitionOutcome, job_type: JobType) -> Self {
        let from = match outcome {
            TransitionOutcome::Advanced { from, .. } => Some(from),
            TransitionOutcome::Unchanged => None,
        };
        Self {
            id: id.to_string(),
            changed: from.is_some(),
            from,
            job_type,
        }
    }
}

impl fmt::Display for OutcomeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "{}: {} -> {}", self.id, from, self.job_type),
            None => write!(f, "{}: unchanged ({})", self.id, self.job_type),
        }
    }
}

pub async fn handle(
    engine: &CliEngine,
    command: JobCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        JobCommand::List { filters } => list(engine, &filters, format),
        JobCommand::Show { id } => show(engine, &id, format),
        JobCommand::Create { script_id, answers } => create(engine, &script_id, answers, format),
        JobCommand::Submit { id } => submit(engine, &id, format).await,
        JobCommand::Monitor { id } => {
            let outcome = engine.monitor(&id).await.map_err(BjError::transition)?;
            print_outcome(engine, &id, outcome, format)?;
            Ok(())
        }
        JobCommand::Cancel { id } => {
            let outcome = engine.cancel(&id).await.map_err(BjError::transition)?;
            print_outcome(engine, &id, outcome, format)?;
            Ok(())
        }
    }
}

fn list(engine: &CliEngine, filters: &[String], format: OutputFormat) -> anyhow::Result<()> {
    let matcher = super::matcher(filters)?;
    let jobs = engine.list_jobs(&matcher).map_err(BjError::transition)?;
    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
    output::print_list(&rows, &job_header(), "No jobs", format);
    Ok(())
}

fn show(engine: &CliEngine, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let job = engine.open_job(id).map_err(BjError::transition)?;
    output::print(&JobDetail::from(&job), format);
    Ok(())
}

fn create(
    engine: &CliEngine,
    script_id: &str,
    answers: Vec<(String, Value)>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let answers: BTreeMap<String, Value> = answers.into_iter().collect();
    let job = engine
        .create_job(script_id, answers)
        .map_err(BjError::transition)?;
    match format {
        OutputFormat::Text => println!("{}", job.id()),
        OutputFormat::Json => output::print(&JobDetail::from(&job), format),
    }
    Ok(())
}

async fn submit(engine: &CliEngine, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = engine.submit(id).await.map_err(BjError::transition)?;
    let job = print_outcome(engine, id, outcome, format)?;
    if job.stored_type() == JobType::FailedSubmission {
        let diagnostic = job.metadata().and_then(|m| m.diagnostic.as_ref());
        return Err(BjError::submission_failed(id, diagnostic).into());
    }
    Ok(())
}

/// Print what a transition did, reading the job's state after it
fn print_outcome(
    engine: &CliEngine,
    id: &str,
    outcome: TransitionOutcome,
    format: OutputFormat,
) -> Result<Job, BjError> {
    let job = engine.catalog().job(id).map_err(BjError::store)?;
    let row = OutcomeRow::new(id, outcome, job.effective().job_type);
    match format {
        OutputFormat::Text => println!("{}", row),
        OutputFormat::Json => output::print(&row, format),
    }
    Ok(job)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
