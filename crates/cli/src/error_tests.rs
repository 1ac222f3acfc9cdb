// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bj_core::JobType;
use chrono::Utc;

fn diagnostic(operation: &str, message: &str, stderr: &str) -> Diagnostic {
    Diagnostic {
        operation: operation.to_string(),
        exit_code: Some(1),
        timed_out: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        message: Some(message.to_string()),
        recorded_at: Utc::now(),
    }
}

#[test]
fn display_lists_context_and_suggestions() {
    let err = BjError::new("Something went wrong")
        .with_context("First context")
        .with_context("Second context")
        .with_suggestion("Try this")
        .with_suggestion("Or this");

    let output = format!("{}", err);
    assert!(output.starts_with("error: Something went wrong\n"));
    assert!(output.contains("-> First context"));
    assert!(output.contains("-> Second context"));
    assert!(output.contains("1. Try this"));
    assert!(output.contains("2. Or this"));
}

#[test]
fn missing_job_suggests_listing() {
    let err = BjError::store(StoreError::NotFound {
        kind: "job",
        id: "job-7".to_string(),
    });
    let output = err.to_string();
    assert!(output.contains("job 'job-7' not found"));
    assert!(output.contains("bj job list"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn invalid_state_names_both_states() {
    let err = BjError::transition(TransitionError::InvalidState {
        job_id: "job-1".to_string(),
        job_type: JobType::Running,
        expected: JobType::Bootstrapping,
    });
    let output = err.to_string();
    assert!(output.contains("job 'job-1' is RUNNING"));
    assert!(output.contains("needs a BOOTSTRAPPING job"));
}

#[test]
fn unconfigured_adapter_suggests_config_key() {
    let err = BjError::adapter_failed(
        "job-1",
        &diagnostic("cancel", "no adapter command configured for cancel", ""),
    );
    let output = err.to_string();
    assert!(output.contains("adapter cancel failed for job 'job-1'"));
    assert!(output.contains("Set adapter.cancel in the config file"));
}

#[test]
fn stderr_is_shown_once() {
    let repeated = BjError::adapter_failed(
        "job-1",
        &diagnostic(
            "submit",
            "adapter submit exited with status 1: sbatch: error: bad account",
            "sbatch: error: bad account\n",
        ),
    );
    assert_eq!(repeated.context.len(), 1);

    let separate = BjError::adapter_failed(
        "job-1",
        &diagnostic("submit", "adapter submit timed out after 30s", "partial\nlast line\n"),
    );
    assert_eq!(separate.context[1], "stderr: last line");
}

#[test]
fn submission_failure_points_at_show() {
    let diag = diagnostic("submit", "adapter submit timed out after 30s", "");
    let err = BjError::submission_failed("job-3", Some(&diag));
    let output = err.to_string();
    assert!(output.contains("submission of job 'job-3' failed"));
    assert!(output.contains("timed out after 30s"));
    assert!(output.contains("bj job show job-3"));
}
