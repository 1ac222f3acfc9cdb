//! Shared helpers for CLI specs
//!
//! Each `Project` is a temp directory holding a data dir, a config file
//! pointing at it, and shell scripts standing in for the scheduler adapter.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ADAPTER_OPS: [&str; 4] = ["submit", "monitor_singleton", "monitor_array", "cancel"];

pub struct Project {
    dir: TempDir,
}

impl Project {
    /// A project with an empty data dir and adapter commands wired to
    /// `adapter/<operation>.sh` (missing scripts fail when called)
    pub fn empty() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        project.config("");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_path(&self) -> PathBuf {
        self.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Rewrite config.toml; `extra` is inserted before the adapter table
    pub fn config(&self, extra: &str) {
        let mut config = format!(
            "data_dir = \"{}\"\nadapter_timeout = \"5s\"\n{}\n\n[adapter]\n",
            self.data_path().display(),
            extra
        );
        for op in ADAPTER_OPS {
            let script = self.path().join("adapter").join(format!("{}.sh", op));
            config.push_str(&format!("{} = \"sh {}\"\n", op, script.display()));
        }
        self.file("config.toml", &config);
    }

    /// Script body for one adapter operation
    pub fn adapter(&self, op: &str, body: &str) {
        self.file(&format!("adapter/{}.sh", op), body);
    }

    pub fn script(&self, id: &str, template_id: &str, name: &str) {
        self.file(
            &format!("data/scripts/{}/metadata.json", id),
            &format!(
                r#"{{"version": 1, "id": "{}", "template_id": "{}", "script_name": "{}", "created_at": "2026-01-05T09:00:00Z"}}"#,
                id, template_id, name
            ),
        );
    }

    pub fn template(&self, id: &str, name: &str, synopsis: &str) {
        self.file(
            &format!("data/templates/{}/metadata.json", id),
            &format!(
                r#"{{"version": 1, "id": "{}", "name": "{}", "synopsis": "{}"}}"#,
                id, name, synopsis
            ),
        );
    }

    pub fn job_path(&self, id: &str) -> PathBuf {
        self.data_path().join("jobs").join(id)
    }

    /// Parsed metadata.json of a job
    pub fn job_json(&self, id: &str) -> serde_json::Value {
        let content = std::fs::read_to_string(self.job_path(id).join("metadata.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn bj(&self) -> CliBuilder {
        CliBuilder {
            args: Vec::new(),
            config: self.config_path(),
            envs: Vec::new(),
        }
    }

    /// Create a job from `script_id` and return its id
    pub fn create_job(&self, script_id: &str) -> String {
        self.bj()
            .args(&["job", "create", script_id])
            .passes()
            .stdout()
            .trim()
            .to_string()
    }
}

pub struct CliBuilder {
    args: Vec<String>,
    config: PathBuf,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn run(self) -> std::process::Output {
        let mut cmd = Command::cargo_bin("bj").unwrap();
        cmd.args(&self.args)
            .env("BJ_CONFIG", &self.config)
            .env_remove("BJ_LOG");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd.output().unwrap()
    }

    /// Run and require exit status 0
    pub fn passes(self) -> RunAssert {
        let args = self.args.join(" ");
        let output = self.run();
        let result = RunAssert::from(output.clone());
        assert!(
            output.status.success(),
            "`bj {}` failed\nstdout:\n{}\nstderr:\n{}",
            args,
            result.stdout,
            result.stderr
        );
        result
    }

    /// Run and require a non-zero exit status
    pub fn fails(self) -> RunAssert {
        let args = self.args.join(" ");
        let output = self.run();
        let result = RunAssert::from(output.clone());
        assert!(
            !output.status.success(),
            "`bj {}` unexpectedly passed\nstdout:\n{}",
            args,
            result.stdout
        );
        result
    }
}

pub struct RunAssert {
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout lacks {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout has {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr lacks {:?}:\n{}",
            needle,
            self.stderr
        );
        self
    }
}
