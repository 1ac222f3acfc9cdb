// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned metadata documents
//!
//! Each document type knows its current schema version, how to migrate an
//! older on-disk shape forward, and how to validate itself. Keys a version
//! does not recognise are carried in an `extra` bag so migrations are never
//! destructive.

mod job;
mod legacy;
mod script;
mod template;

pub use job::{Diagnostic, JobMetadata, Submission, TaskMetadata};
pub use script::ScriptMetadata;
pub use template::TemplateMetadata;

use crate::validation::{ValidationContext, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that prevent a stored document from reaching the current version
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("document is not a mapping")]
    NotAMapping,
    #[error("version field is not a non-negative integer: {0}")]
    InvalidVersion(Value),
    #[error("version {found} is newer than supported version {current}")]
    UnsupportedVersion { found: u32, current: u32 },
    #[error("version {version} document has an invalid shape: {source}")]
    Shape {
        version: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown legacy state '{state}' in version {version} document")]
    UnknownLegacyState { version: u32, state: String },
}

/// A persisted, versioned, schema-validated document
pub trait Document:
    Clone + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Human-readable kind, used in logs and errors
    const KIND: &'static str;

    /// The version this build writes
    const CURRENT_VERSION: u32;

    /// Build the current shape from any supported stored shape
    fn from_value(value: Value) -> Result<Self, MigrationError>;

    /// Run schema validation, returning every error found
    fn validate(&self, context: ValidationContext) -> Vec<ValidationError>;

    fn id(&self) -> &str;

    /// Attributes exposed to listing filters
    fn attributes(&self) -> BTreeMap<String, String>;
}

/// Read the `version` field of a stored document; absent means version 1
pub(crate) fn stored_version(value: &Value) -> Result<u32, MigrationError> {
    let map = value.as_object().ok_or(MigrationError::NotAMapping)?;
    match map.get("version") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| MigrationError::InvalidVersion(v.clone())),
    }
}

/// Deserialize a document of a known version
pub(crate) fn shape<T: DeserializeOwned>(value: Value, version: u32) -> Result<T, MigrationError> {
    serde_json::from_value(value).map_err(|source| MigrationError::Shape { version, source })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
