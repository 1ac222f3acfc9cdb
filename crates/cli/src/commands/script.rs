// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script catalog commands

use crate::error::BjError;
use crate::output::{self, cell, OutputFormat};
use crate::CliEngine;
use bj_core::ScriptMetadata;
use bj_storage::Record;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommand,
}

#[derive(Subcommand)]
pub enum ScriptCommand {
    /// List scripts, optionally filtered by attribute
    List {
        /// Attribute filter KEY=PATTERN[,PATTERN...]
        #[arg(long = "filter", short = 'f', value_name = "KEY=PATTERNS")]
        filters: Vec<String>,
    },
    /// Show a script
    Show {
        /// Script id
        id: String,
    },
}

#[derive(Serialize)]
struct ScriptRow {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    broken: Option<String>,
}

impl From<&Record<ScriptMetadata>> for ScriptRow {
    fn from(record: &Record<ScriptMetadata>) -> Self {
        let doc = record.document();
        Self {
            id: record.id.clone(),
            template_id: doc.map(|d| d.template_id.clone()),
            script_name: doc.map(|d| d.script_name.clone()),
            broken: record.loaded.broken().map(|b| b.reason.to_string()),
        }
    }
}

impl fmt::Display for ScriptRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.broken.is_some() {
            return write!(f, "{:<38} BROKEN", self.id);
        }
        write!(
            f,
            "{:<38} {:<24} {}",
            self.id,
            cell(self.template_id.as_deref()),
            cell(self.script_name.as_deref())
        )
    }
}

struct ScriptDetail<'a>(&'a ScriptMetadata);

impl Serialize for ScriptDetail<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl fmt::Display for ScriptDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let script = self.0;
        writeln!(f, "Script: {}", script.id)?;
        writeln!(f, "  Template: {}", script.template_id)?;
        writeln!(f, "  Name: {}", script.script_name)?;
        writeln!(f, "  Created: {}", script.created_at.to_rfc3339())?;
        if !script.tags.is_empty() {
            writeln!(f, "  Tags: {}", script.tags.join(", "))?;
        }
        Ok(())
    }
}

pub fn handle(
    engine: &CliEngine,
    command: ScriptCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ScriptCommand::List { filters } => {
            let matcher = super::matcher(&filters)?;
            let scripts = engine
                .catalog()
                .list_scripts(&matcher)
                .map_err(BjError::store)?;
            let rows: Vec<ScriptRow> = scripts.iter().map(ScriptRow::from).collect();
            let header = format!("{:<38} {:<24} {}", "ID", "TEMPLATE", "NAME");
            output::print_list(&rows, &header, "No scripts", format);
        }
        ScriptCommand::Show { id } => {
            let record = engine.catalog().script(&id).map_err(BjError::store)?;
            let Some(script) = record.document() else {
                let reason = record
                    .loaded
                    .broken()
                    .map(|b| b.reason.to_string())
                    .unwrap_or_default();
                return Err(BjError::new(format!("script '{}' is broken", id))
                    .with_context(reason)
                    .with_suggestion(format!("Inspect {}", record.path.display()))
                    .into());
            };
            output::print(&ScriptDetail(script), format);
        }
    }
    Ok(())
}
