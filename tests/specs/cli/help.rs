//! Help and usage specs

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    Command::cargo_bin("bj")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("job")
                .and(predicate::str::contains("script"))
                .and(predicate::str::contains("template"))
                .and(predicate::str::contains("poll"))
                .and(predicate::str::contains("--config")),
        );
}

#[test]
fn job_help_lists_operations() {
    Command::cargo_bin("bj")
        .unwrap()
        .args(["job", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("submit"))
                .and(predicate::str::contains("monitor"))
                .and(predicate::str::contains("cancel")),
        );
}

#[test]
fn missing_subcommand_prints_usage() {
    Command::cargo_bin("bj")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: bj"));
}

#[test]
fn bad_watch_interval_is_rejected() {
    Command::cargo_bin("bj")
        .unwrap()
        .args(["poll", "--watch", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'soon'"));
}
