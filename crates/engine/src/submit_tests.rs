// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::Fixture;
use bj_adapters::SchedulerCall;
use bj_core::Config;
use bj_storage::StoreError;

#[tokio::test]
async fn successful_submit_records_scheduler_id() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter.push_output(
        AdapterOperation::Submit,
        r#"{"scheduler_id": "88123", "job_kind": "ARRAY"}"#,
    );

    let outcome = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Advanced {
            from: JobType::Bootstrapping,
            to: JobType::Submitted
        }
    );

    let job = fx.open(job.id());
    let doc = job.metadata().unwrap();
    assert_eq!(doc.job_type, JobType::Submitted);
    assert_eq!(doc.scheduler_id.as_deref(), Some("88123"));
    assert_eq!(doc.job_kind, Some(JobKind::Array));
    let submission = doc.submission.as_ref().unwrap();
    assert_eq!(submission.status, 0);
    assert_eq!(submission.host, None);
    assert_eq!(submission.submitted_at, fx.clock.now());
    assert!(job.dir().marker_path().exists());
}

#[tokio::test]
async fn numeric_scheduler_id_defaults_to_singleton() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter
        .push_output(AdapterOperation::Submit, r#"{"scheduler_id": 4242}"#);

    SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert_eq!(doc.scheduler_id.as_deref(), Some("4242"));
    assert_eq!(doc.job_kind, Some(JobKind::Singleton));
}

#[tokio::test]
async fn adapter_sees_job_dir_and_selected_host() {
    let mut fx = Fixture::new();
    fx.config.submission_hosts = vec!["login7".to_string()];
    fx.ctx = TransitionContext::new(&fx.config, fx.adapter.clone(), fx.clock.clone());
    let mut job = fx.bootstrapping();
    fx.adapter
        .push_output(AdapterOperation::Submit, r#"{"scheduler_id": "1"}"#);

    SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();

    assert_eq!(
        fx.adapter.calls(),
        vec![SchedulerCall::Submit {
            job_dir: job.dir().path().to_path_buf(),
            host: Some("login7".to_string()),
        }]
    );
    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert_eq!(
        doc.submission.and_then(|s| s.host).as_deref(),
        Some("login7")
    );
}

#[tokio::test]
async fn nonzero_exit_fails_submission() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter
        .push_failure(AdapterOperation::Submit, 1, "sbatch: error: invalid account");

    let outcome = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Advanced {
            from: JobType::Bootstrapping,
            to: JobType::FailedSubmission
        }
    );

    let job = fx.open(job.id());
    let doc = job.metadata().unwrap();
    assert_eq!(doc.job_type, JobType::FailedSubmission);
    let submission = doc.submission.as_ref().unwrap();
    assert_eq!(submission.status, 1);
    assert_eq!(submission.stderr, "sbatch: error: invalid account");
    assert_eq!(
        doc.diagnostic.as_ref().and_then(|d| d.exit_code),
        Some(1)
    );
    assert!(!job.dir().marker_path().exists());
}

#[tokio::test]
async fn timeout_fails_submission_instead_of_hanging() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter.push_hang(AdapterOperation::Submit);

    let outcome = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Advanced {
            from: JobType::Bootstrapping,
            to: JobType::FailedSubmission
        }
    );
    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert!(doc.diagnostic.unwrap().timed_out);
    assert_eq!(doc.submission.map(|s| s.status), Some(-1));
}

#[tokio::test]
async fn unparseable_output_fails_submission() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter
        .push_output(AdapterOperation::Submit, "Submitted batch job 12");

    SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert_eq!(doc.job_type, JobType::FailedSubmission);
    assert_eq!(doc.submission.as_ref().map(|s| s.status), Some(0));
    assert!(doc.diagnostic.is_some());
}

#[tokio::test]
async fn empty_scheduler_id_fails_submission() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    fx.adapter
        .push_output(AdapterOperation::Submit, r#"{"scheduler_id": "  "}"#);

    SubmitTransition::run(&fx.ctx, &mut job).await.unwrap();
    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert_eq!(doc.job_type, JobType::FailedSubmission);
    assert_eq!(
        doc.diagnostic.and_then(|d| d.message).as_deref(),
        Some("adapter submit returned an empty scheduler_id")
    );
}

#[tokio::test]
async fn submit_requires_bootstrapping() {
    let fx = Fixture::new();
    let mut job = fx.submitted(JobKind::Singleton, JobType::Submitted);

    let err = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap_err();
    assert!(matches!(
        err,
        TransitionError::InvalidState {
            job_type: JobType::Submitted,
            expected: JobType::Bootstrapping,
            ..
        }
    ));
    assert!(fx.adapter.calls().is_empty());
}

#[tokio::test]
async fn submit_on_broken_job_reports_why() {
    let fx = Fixture::new();
    let job = fx.bootstrapping();
    std::fs::write(job.dir().metadata_path(), "{\"id\": 3").unwrap();
    let mut job = fx.open(job.id());

    let err = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap_err();
    match err {
        TransitionError::Broken { job_id, reason } => {
            assert_eq!(job_id, "job-1");
            assert!(reason.contains("invalid JSON"), "reason: {}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn failed_submission_without_status_keeps_diagnostic() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    let diagnostic = fx.ctx.helper().diagnostic(
        AdapterOperation::Submit,
        None,
        false,
        "adapter submit returned nothing".to_string(),
    );

    FailedSubmissionTransition::run(&fx.ctx, &mut job, diagnostic, Some("login1".into())).unwrap();

    let doc = fx.open(job.id()).metadata().cloned().unwrap();
    assert_eq!(doc.job_type, JobType::FailedSubmission);
    assert_eq!(doc.end_time, Some(fx.clock.now()));
    let submission = doc.submission.unwrap();
    assert_eq!(submission.status, -1);
    assert_eq!(submission.host.as_deref(), Some("login1"));
}

#[test]
fn default_config_timeout_is_thirty_seconds() {
    let fx = Fixture::new();
    let ctx = TransitionContext::new(&Config::default(), fx.adapter.clone(), fx.clock.clone());
    assert_eq!(ctx.adapter_timeout, std::time::Duration::from_secs(30));
}

#[tokio::test]
async fn refused_store_error_surfaces() {
    let fx = Fixture::new();
    let mut job = fx.bootstrapping();
    // A script_id that fails save validation makes every save refuse
    job.metadata_mut().unwrap().script_id = String::new();

    let err = SubmitTransition::run(&fx.ctx, &mut job).await.unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Store(StoreError::ValidationRefused { .. })
    ));
    assert!(fx.adapter.calls().is_empty());
}
