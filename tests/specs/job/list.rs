//! Job listing specs

use crate::prelude::*;

#[test]
fn empty_list() {
    let temp = Project::empty();

    temp.bj()
        .args(&["job", "list"])
        .passes()
        .stdout_eq("No jobs\n");
}

#[test]
fn list_shows_header_and_jobs() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    let id = temp.create_job("train");

    let stdout = temp.bj().args(&["job", "list"]).passes().stdout();
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("ID "));
    assert!(header.contains("TYPE"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&id));
    assert!(row.contains("BOOTSTRAPPING"));
    assert!(row.ends_with("train"));
}

#[test]
fn filter_by_job_type() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.adapter("submit", r#"echo '{"scheduler_id": "1"}'"#);
    let waiting = temp.create_job("train");
    let submitted = temp.create_job("train");
    temp.bj().args(&["job", "submit", &submitted]).passes();

    temp.bj()
        .args(&["job", "list", "--filter", "job_type=submitted"])
        .passes()
        .stdout_has(&submitted)
        .stdout_lacks(&waiting);
    temp.bj()
        .args(&["job", "list", "-f", "job-type=SUBMITTED,bootstrapping"])
        .passes()
        .stdout_has(&submitted)
        .stdout_has(&waiting);
    temp.bj()
        .args(&["job", "list", "-f", "job_type=submitted", "-f", "script_id=other"])
        .passes()
        .stdout_eq("No jobs\n");
}

#[test]
fn broken_job_is_always_listed() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    let good = temp.create_job("train");
    temp.file("data/jobs/zz-broken/metadata.json", "{ truncated");

    temp.bj()
        .args(&["job", "list", "--filter", "job_type=RUNNING"])
        .passes()
        .stdout_has("zz-broken")
        .stdout_has("BROKEN")
        .stdout_lacks(&good);
}

#[test]
fn list_as_json() {
    let temp = Project::empty();
    temp.script("train", "resnet", "train.sh");
    temp.create_job("train");
    temp.create_job("train");
    temp.file("data/jobs/broken/metadata.json", "[]");

    let json = temp
        .bj()
        .args(&["--output", "json", "job", "list"])
        .passes()
        .stdout_json();
    let jobs = json.as_array().unwrap();
    assert_eq!(jobs.len(), 3);
    let broken: Vec<_> = jobs
        .iter()
        .filter(|j| j["job_type"] == "BROKEN")
        .collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0]["id"], "broken");
    assert_eq!(broken[0]["broken"], "metadata is not a mapping");
}
