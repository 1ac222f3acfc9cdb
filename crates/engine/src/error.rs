// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for job transitions

use bj_core::{Diagnostic, JobType};
use bj_storage::StoreError;
use thiserror::Error;

/// Errors that stop a transition.
///
/// Adapter failures during submit and monitor are not errors: they are
/// recorded on the job as FAILED_SUBMISSION or FAILED.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("job {job_id} is broken: {reason}")]
    Broken { job_id: String, reason: String },
    #[error("job {job_id} is {job_type}, expected {expected}")]
    InvalidState {
        job_id: String,
        job_type: JobType,
        expected: JobType,
    },
    #[error("job {job_id} has not been submitted (no scheduler id)")]
    NotSubmitted { job_id: String },
    #[error("{} failed for job {job_id}: {}", diagnostic.operation, diagnostic_message(diagnostic))]
    Adapter {
        job_id: String,
        diagnostic: Box<Diagnostic>,
    },
}

fn diagnostic_message(diagnostic: &Diagnostic) -> &str {
    diagnostic.message.as_deref().unwrap_or("adapter failed")
}
