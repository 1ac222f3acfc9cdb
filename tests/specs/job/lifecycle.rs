//! Job create/submit/monitor/cancel specs

use crate::prelude::*;

const SUBMIT_OK: &str = r#"echo '{"scheduler_id": "4242"}'"#;

#[test]
fn create_writes_bootstrapping_job() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");

    let id = temp
        .bj()
        .args(&["job", "create", "train", "--answer", "epochs=3", "-a", "name=run one"])
        .passes()
        .stdout()
        .trim()
        .to_string();

    let doc = temp.job_json(&id);
    assert_eq!(doc["id"], id.as_str());
    assert_eq!(doc["script_id"], "train");
    assert_eq!(doc["job_type"], "BOOTSTRAPPING");
    assert_eq!(doc["answers"]["epochs"], 3);
    assert_eq!(doc["answers"]["name"], "run one");
    assert!(temp.job_path(&id).join("active_index").exists());
}

#[test]
fn create_from_unknown_script_fails() {
    let temp = Project::empty();

    temp.bj()
        .args(&["job", "create", "missing"])
        .fails()
        .stderr_has("script 'missing' not found");
}

#[test]
fn submit_monitor_cancel() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", SUBMIT_OK);
    temp.adapter("monitor_singleton", r#"echo '{"state": "RUNNING"}'"#);
    temp.adapter("cancel", "exit 0");
    let id = temp.create_job("train");

    temp.bj()
        .args(&["job", "submit", &id])
        .passes()
        .stdout_eq(&format!("{}: BOOTSTRAPPING -> SUBMITTED\n", id));
    temp.bj()
        .args(&["job", "monitor", &id])
        .passes()
        .stdout_eq(&format!("{}: SUBMITTED -> RUNNING\n", id));
    temp.bj()
        .args(&["job", "monitor", &id])
        .passes()
        .stdout_eq(&format!("{}: unchanged (RUNNING)\n", id));
    temp.bj()
        .args(&["job", "cancel", &id])
        .passes()
        .stdout_eq(&format!("{}: RUNNING -> CANCELLED\n", id));

    temp.bj()
        .args(&["job", "show", &id])
        .passes()
        .stdout_has("Type: CANCELLED")
        .stdout_has("Kind: SINGLETON")
        .stdout_has("Scheduler id: 4242")
        .stdout_has("Submission: status 0");
    assert!(!temp.job_path(&id).join("active_index").exists());
}

#[test]
fn adapter_receives_job_dir_and_scheduler_id() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter(
        "submit",
        r#"echo "$1|$BJ_JOB_DIR" > "$BJ_JOB_DIR/submit.args"
echo '{"scheduler_id": "17"}'"#,
    );
    temp.adapter(
        "monitor_singleton",
        r#"echo "$2|$BJ_SCHEDULER_ID" > "$1/monitor.args"
echo '{"state": "PENDING"}'"#,
    );
    let id = temp.create_job("train");

    temp.bj().args(&["job", "submit", &id]).passes();
    temp.bj().args(&["job", "monitor", &id]).passes();

    let job_dir = temp.job_path(&id);
    let submit_args = std::fs::read_to_string(job_dir.join("submit.args")).unwrap();
    assert_eq!(
        submit_args.trim(),
        format!("{}|{}", job_dir.display(), job_dir.display())
    );
    let monitor_args = std::fs::read_to_string(job_dir.join("monitor.args")).unwrap();
    assert_eq!(monitor_args.trim(), "17|17");
}

#[test]
fn failed_submission_is_recorded_and_reported() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter(
        "submit",
        "echo 'sbatch: error: invalid account' >&2\nexit 1",
    );
    let id = temp.create_job("train");

    temp.bj()
        .args(&["job", "submit", &id])
        .fails()
        .stdout_has("BOOTSTRAPPING -> FAILED_SUBMISSION")
        .stderr_has(&format!("submission of job '{}' failed", id))
        .stderr_has("invalid account");

    let doc = temp.job_json(&id);
    assert_eq!(doc["job_type"], "FAILED_SUBMISSION");
    assert_eq!(doc["submission"]["status"], 1);
    assert_eq!(doc["diagnostic"]["operation"], "submit");
    assert!(!temp.job_path(&id).join("active_index").exists());
}

#[test]
fn unconfigured_adapter_fails_submission() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    // config.toml points at adapter scripts that do not exist
    let id = temp.create_job("train");

    temp.bj()
        .args(&["job", "submit", &id])
        .fails()
        .stdout_has("FAILED_SUBMISSION");
}

#[test]
fn second_submit_is_refused() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", SUBMIT_OK);
    let id = temp.create_job("train");
    temp.bj().args(&["job", "submit", &id]).passes();

    temp.bj()
        .args(&["job", "submit", &id])
        .fails()
        .stderr_has("is SUBMITTED")
        .stderr_has("needs a BOOTSTRAPPING job");
}

#[test]
fn cancel_before_submit_is_refused() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    let id = temp.create_job("train");

    temp.bj()
        .args(&["job", "cancel", &id])
        .fails()
        .stderr_has("has not been submitted")
        .stderr_has(&format!("bj job submit {}", id));
}

#[test]
fn cancel_failure_leaves_job_running() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", SUBMIT_OK);
    temp.adapter("monitor_singleton", r#"echo '{"state": "RUNNING"}'"#);
    temp.adapter("cancel", "echo 'scancel: error: access denied' >&2\nexit 3");
    let id = temp.create_job("train");
    temp.bj().args(&["job", "submit", &id]).passes();
    temp.bj().args(&["job", "monitor", &id]).passes();

    temp.bj()
        .args(&["job", "cancel", &id])
        .fails()
        .stderr_has("adapter cancel failed")
        .stderr_has("access denied");
    assert_eq!(temp.job_json(&id)["job_type"], "RUNNING");
}

#[test]
fn show_reports_control_overrides() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", SUBMIT_OK);
    let id = temp.create_job("train");
    temp.bj().args(&["job", "submit", &id]).passes();
    temp.file(
        &format!("data/jobs/{}/controls/job_type", id),
        "RUNNING\n",
    );

    temp.bj()
        .args(&["job", "show", &id])
        .passes()
        .stdout_has("Type: RUNNING (stored SUBMITTED)");
}

#[test]
fn show_as_json() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    let id = temp.create_job("train");

    let json = temp
        .bj()
        .args(&["--output", "json", "job", "show", &id])
        .passes()
        .stdout_json();
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["job_type"], "BOOTSTRAPPING");
    assert_eq!(json["active"], true);
    assert_eq!(json["metadata"]["script_id"], "train");
}

#[test]
fn broken_job_is_shown_with_reason() {
    let temp = Project::empty();
    temp.file("data/jobs/job-x/metadata.json", "[1, 2, 3]");

    temp.bj()
        .args(&["job", "show", "job-x"])
        .passes()
        .stdout_has("Type: BROKEN")
        .stdout_has("Broken: metadata is not a mapping");
    for command in ["submit", "monitor", "cancel"] {
        temp.bj()
            .args(&["job", command, "job-x"])
            .fails()
            .stderr_has("job 'job-x' is broken");
    }
}
