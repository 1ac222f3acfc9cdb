//! Error reporting specs
//!
//! Failures print `error: ...` with context and suggestions on stderr and
//! exit non-zero.

use crate::prelude::*;

#[test]
fn unknown_job_suggests_listing() {
    let temp = Project::empty();

    temp.bj()
        .args(&["job", "show", "nope"])
        .fails()
        .stderr_has("error: job 'nope' not found")
        .stderr_has("bj job list");
}

#[test]
fn path_like_job_id_is_rejected() {
    let temp = Project::empty();

    temp.bj()
        .args(&["job", "show", "../etc"])
        .fails()
        .stderr_has("invalid job id '../etc'");
}

#[test]
fn invalid_config_value_is_reported() {
    let temp = Project::empty();
    temp.config("monitor_concurrency = 0");

    temp.bj()
        .args(&["job", "list"])
        .fails()
        .stderr_has("monitor_concurrency must be at least 1");
}

#[test]
fn unknown_config_key_is_reported() {
    let temp = Project::empty();
    temp.config("colour = true");

    temp.bj()
        .args(&["job", "list"])
        .fails()
        .stderr_has("failed to parse config")
        .stderr_has("--config");
}

#[test]
fn explicit_config_wins_over_environment() {
    let temp = Project::empty();
    temp.file("other.toml", "monitor_concurrency = 0\n");
    let other = temp.path().join("other.toml");

    temp.bj()
        .args(&["--config", other.to_str().unwrap(), "job", "list"])
        .fails()
        .stderr_has("monitor_concurrency must be at least 1");
}

#[test]
fn missing_config_file_is_reported() {
    let temp = Project::empty();

    temp.bj()
        .args(&["--config", "/nonexistent/bj.toml", "job", "list"])
        .fails()
        .stderr_has("failed to read config /nonexistent/bj.toml");
}

#[test]
fn malformed_filter_is_reported() {
    let temp = Project::empty();

    temp.bj()
        .args(&["job", "list", "--filter", "running"])
        .fails()
        .stderr_has("Filters look like");
}
