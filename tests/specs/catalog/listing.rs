//! Script and template catalog specs

use crate::prelude::*;

#[test]
fn empty_catalogs() {
    let temp = Project::empty();

    temp.bj()
        .args(&["script", "list"])
        .passes()
        .stdout_eq("No scripts\n");
    temp.bj()
        .args(&["template", "list"])
        .passes()
        .stdout_eq("No templates\n");
}

#[test]
fn scripts_are_listed_by_id() {
    let temp = Project::empty();
    temp.script("train-b", "resnet", "train.sh");
    temp.script("train-a", "bert", "finetune.sh");

    let stdout = temp.bj().args(&["script", "list"]).passes().stdout();
    let ids: Vec<_> = stdout
        .lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(ids, vec!["train-a", "train-b"]);
    assert!(stdout.starts_with("ID "));
}

#[test]
fn script_filter_is_case_insensitive_glob() {
    let temp = Project::empty();
    temp.script("train-a", "resnet-50", "train.sh");
    temp.script("train-b", "bert", "finetune.sh");

    temp.bj()
        .args(&["script", "list", "--filter", "template-id=RESNET*"])
        .passes()
        .stdout_has("train-a")
        .stdout_lacks("train-b");
}

#[test]
fn broken_script_is_listed_regardless_of_filter() {
    let temp = Project::empty();
    temp.script("good", "resnet", "train.sh");
    temp.file("data/scripts/bad/metadata.json", "{ not json");

    temp.bj()
        .args(&["script", "list", "--filter", "template_id=none"])
        .passes()
        .stdout_has("bad")
        .stdout_has("BROKEN")
        .stdout_lacks("good");
}

#[test]
fn script_show() {
    let temp = Project::empty();
    temp.script("train-a", "resnet", "train.sh");

    temp.bj()
        .args(&["script", "show", "train-a"])
        .passes()
        .stdout_has("Script: train-a")
        .stdout_has("Template: resnet")
        .stdout_has("Name: train.sh");

    let json = temp
        .bj()
        .args(&["--output", "json", "script", "show", "train-a"])
        .passes()
        .stdout_json();
    assert_eq!(json["template_id"], "resnet");
    assert_eq!(json["version"], 1);
}

#[test]
fn missing_script_suggests_listing() {
    let temp = Project::empty();

    temp.bj()
        .args(&["script", "show", "ghost"])
        .fails()
        .stderr_has("script 'ghost' not found")
        .stderr_has("bj script list");
}

#[test]
fn templates_are_listed() {
    let temp = Project::empty();
    temp.template("resnet", "ResNet training", "Train a ResNet on a dataset");

    temp.bj()
        .args(&["template", "list"])
        .passes()
        .stdout_has("resnet")
        .stdout_has("ResNet training")
        .stdout_has("Train a ResNet on a dataset");
}
