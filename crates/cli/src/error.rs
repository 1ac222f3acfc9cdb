// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Library errors say what went wrong; this adds where to look and what to
//! try next, for the failures a user can act on.

use bj_core::{ConfigError, Diagnostic};
use bj_engine::TransitionError;
use bj_storage::StoreError;
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct BjError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BjError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for BjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for BjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Last non-empty line of adapter stderr, if any
fn last_stderr_line(diagnostic: &Diagnostic) -> Option<&str> {
    diagnostic
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
}

/// Builders for the failures commands report.
impl BjError {
    pub fn config(err: ConfigError) -> Self {
        let message = err.to_string();
        BjError::new(message)
            .with_suggestion("Pass a config file with --config <path> or set BJ_CONFIG")
            .with_source(err)
    }

    pub fn store(err: StoreError) -> Self {
        let e = match &err {
            StoreError::NotFound { kind, id } => {
                BjError::new(format!("{} '{}' not found", kind, id))
                    .with_suggestion(format!("List {}s: bj {} list", kind, kind))
            }
            StoreError::Broken { kind, path, reason } => {
                BjError::new(format!("{} metadata is broken", kind))
                    .with_context(reason.to_string())
                    .with_suggestion(format!("Inspect {}", path.display()))
            }
            StoreError::ValidationRefused { errors, .. } => {
                BjError::new("refusing to save invalid metadata").with_context(errors.to_string())
            }
            _ => BjError::new(err.to_string()),
        };
        e.with_source(err)
    }

    pub fn transition(err: TransitionError) -> Self {
        match err {
            TransitionError::Store(e) => BjError::store(e),
            TransitionError::Broken { job_id, reason } => {
                BjError::new(format!("job '{}' is broken", job_id))
                    .with_context(reason)
                    .with_suggestion(format!("Inspect the job: bj job show {}", job_id))
            }
            TransitionError::InvalidState {
                job_id,
                job_type,
                expected,
            } => BjError::new(format!("job '{}' is {}", job_id, job_type))
                .with_context(format!("This operation needs a {} job", expected))
                .with_suggestion(format!("Check its state: bj job show {}", job_id)),
            TransitionError::NotSubmitted { job_id } => {
                BjError::new(format!("job '{}' has not been submitted", job_id))
                    .with_context("The scheduler has no id for it yet")
                    .with_suggestion(format!("Submit it first: bj job submit {}", job_id))
            }
            TransitionError::Adapter { job_id, diagnostic } => {
                BjError::adapter_failed(&job_id, &diagnostic)
            }
        }
    }

    pub fn adapter_failed(job_id: &str, diagnostic: &Diagnostic) -> Self {
        let mut e = BjError::new(format!(
            "adapter {} failed for job '{}'",
            diagnostic.operation, job_id
        ));
        if let Some(message) = &diagnostic.message {
            e = e.with_context(message.clone());
        }
        if let Some(line) = last_stderr_line(diagnostic) {
            if diagnostic.message.as_deref().map_or(true, |m| !m.contains(line)) {
                e = e.with_context(format!("stderr: {}", line));
            }
        }
        if diagnostic
            .message
            .as_deref()
            .is_some_and(|m| m.starts_with("no adapter command configured"))
        {
            e = e.with_suggestion(format!(
                "Set adapter.{} in the config file",
                diagnostic.operation
            ));
        }
        e
    }

    pub fn submission_failed(job_id: &str, diagnostic: Option<&Diagnostic>) -> Self {
        let e = match diagnostic {
            Some(diagnostic) => {
                let mut e = BjError::adapter_failed(job_id, diagnostic);
                e.message = format!("submission of job '{}' failed", job_id);
                e
            }
            None => BjError::new(format!("submission of job '{}' failed", job_id)),
        };
        e.with_suggestion(format!("Inspect the diagnostic: bj job show {}", job_id))
    }

    pub fn poll_failures(count: usize) -> Self {
        BjError::new(format!("{} job(s) could not be polled", count))
            .with_suggestion("Re-run with BJ_LOG=debug for details")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
