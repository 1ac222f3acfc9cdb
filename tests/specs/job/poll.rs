//! Poll specs

use crate::prelude::*;

#[test]
fn poll_with_no_jobs() {
    let temp = Project::empty();

    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_eq("polled 0 job(s): 0 advanced, 0 failed\n");
}

#[test]
fn poll_advances_submitted_jobs() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", r#"echo '{"scheduler_id": "9"}'"#);
    temp.adapter("monitor_singleton", r#"echo '{"state": "COMPLETED"}'"#);
    let first = temp.create_job("train");
    let second = temp.create_job("train");
    temp.bj().args(&["job", "submit", &first]).passes();
    temp.bj().args(&["job", "submit", &second]).passes();

    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_has(&format!("{}: SUBMITTED -> COMPLETED", first))
        .stdout_has(&format!("{}: SUBMITTED -> COMPLETED", second))
        .stdout_has("polled 2 job(s): 2 advanced, 0 failed");

    // Completed jobs drop out of the active set
    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_eq("polled 0 job(s): 0 advanced, 0 failed\n");
}

#[test]
fn poll_settles_jobs_from_adapter_controls() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("monitor_singleton", r#"echo '{"state": "RUNNING"}'"#);
    let id = temp.create_job("train");
    // A submit that wrote its controls but never reached the metadata
    temp.file(&format!("data/jobs/{}/controls/scheduler_id", id), "55\n");
    temp.file(&format!("data/jobs/{}/controls/submit_status", id), "0\n");

    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_has(&format!("{}: BOOTSTRAPPING -> RUNNING", id));

    let doc = temp.job_json(&id);
    assert_eq!(doc["job_type"], "RUNNING");
    assert_eq!(doc["scheduler_id"], "55");
    assert_eq!(doc["submission"]["status"], 0);
}

#[test]
fn poll_tracks_array_tasks() {
    let temp = Project::empty();
    temp.script("sweep", "resnet", "sweep.sh");
    temp.adapter(
        "submit",
        r#"echo '{"scheduler_id": "300", "job_kind": "ARRAY"}'"#,
    );
    temp.adapter(
        "monitor_array",
        r#"echo '{"tasks": [{"index": 0, "state": "COMPLETED"}, {"index": 1, "state": "RUNNING"}, {"index": 2, "state": "PENDING"}]}'"#,
    );
    let id = temp.create_job("sweep");
    temp.bj().args(&["job", "submit", &id]).passes();

    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_has(&format!("{}: SUBMITTED -> RUNNING", id));

    let marker = std::fs::read_to_string(temp.job_path(&id).join("active_index")).unwrap();
    assert_eq!(marker, "1");
    temp.bj()
        .args(&["job", "show", &id])
        .passes()
        .stdout_has("Kind: ARRAY")
        .stdout_has("Tasks:");
}

#[test]
fn monitor_failure_fails_the_job_not_the_tick() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", r#"echo '{"scheduler_id": "9"}'"#);
    temp.adapter("monitor_singleton", "echo 'squeue: error' >&2\nexit 1");
    let id = temp.create_job("train");
    temp.bj().args(&["job", "submit", &id]).passes();

    temp.bj()
        .args(&["poll"])
        .passes()
        .stdout_has(&format!("{}: SUBMITTED -> FAILED", id));
    assert_eq!(temp.job_json(&id)["diagnostic"]["operation"], "monitor_singleton");
}

#[test]
fn poll_as_json() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.create_job("train");

    let json = temp
        .bj()
        .args(&["--output", "json", "poll"])
        .passes()
        .stdout_json();
    assert_eq!(json["checked"], 1);
    assert_eq!(json["advanced"].as_array().unwrap().len(), 0);
    assert_eq!(json["failures"].as_array().unwrap().len(), 0);
}
