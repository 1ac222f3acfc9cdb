// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration
//!
//! Read once by the front end and passed explicitly to every component.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "BJ_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scheduler adapter commands, one per operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    pub submit: Option<String>,
    pub monitor_singleton: Option<String>,
    pub monitor_array: Option<String>,
    pub cancel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the jobs/scripts/templates trees
    pub data_dir: PathBuf,
    /// Hosts to submit from; empty means submit locally
    pub submission_hosts: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub adapter_timeout: Duration,
    /// How long a job may sit in BOOTSTRAPPING without adapter evidence
    #[serde(with = "humantime_serde")]
    pub bootstrap_timeout: Duration,
    /// Jobs monitored at once by a poll tick
    pub monitor_concurrency: usize,
    pub adapter: AdapterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            submission_hosts: Vec::new(),
            adapter_timeout: Duration::from_secs(30),
            bootstrap_timeout: Duration::from_secs(600),
            monitor_concurrency: 4,
            adapter: AdapterConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("bj"))
        .unwrap_or_else(|| PathBuf::from(".bj"))
}

/// `<platform config dir>/bj/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bj").join("config.toml"))
}

impl Config {
    /// A default config rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml(&content, path)
    }

    /// Locate and load the config: an explicit path, then `BJ_CONFIG`, then
    /// the platform config file if it exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::discover_from(explicit, from_env.as_deref(), default_config_path().as_deref())
    }

    pub fn discover_from(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        fallback: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit.or(from_env) {
            return Self::load(path);
        }
        match fallback {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                tracing::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.monitor_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "monitor_concurrency must be at least 1".to_string(),
            ));
        }
        if self.adapter_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "adapter_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.data_dir.join("jobs")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
