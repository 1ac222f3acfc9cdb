// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{shape, stored_version, Document, MigrationError};
use crate::validation::{require, require_version, ValidationContext, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A rendered script that jobs are created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    pub version: u32,
    pub id: String,
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub script_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Document for ScriptMetadata {
    const KIND: &'static str = "script";
    const CURRENT_VERSION: u32 = 1;

    fn from_value(value: Value) -> Result<Self, MigrationError> {
        match stored_version(&value)? {
            1 => {
                let mut value = value;
                // Version-less documents predate the field; stamp them.
                if let Some(map) = value.as_object_mut() {
                    if map.get("version").map_or(true, Value::is_null) {
                        map.insert("version".to_string(), Value::from(1));
                    }
                }
                shape(value, 1)
            }
            found => Err(MigrationError::UnsupportedVersion {
                found,
                current: Self::CURRENT_VERSION,
            }),
        }
    }

    fn validate(&self, context: ValidationContext) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_version(&mut errors, self.version, Self::CURRENT_VERSION);
        require(&mut errors, "id", &self.id);
        if context == ValidationContext::Save {
            require(&mut errors, "template_id", &self.template_id);
            require(&mut errors, "script_name", &self.script_name);
        }
        errors
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("id".to_string(), self.id.clone()),
            ("template_id".to_string(), self.template_id.clone()),
            ("script_name".to_string(), self.script_name.clone()),
        ])
    }
}
