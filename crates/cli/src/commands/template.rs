// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template catalog commands

use crate::error::BjError;
use crate::output::{self, cell, OutputFormat};
use crate::CliEngine;
use bj_core::TemplateMetadata;
use bj_storage::Record;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateCommand,
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List templates, optionally filtered by attribute
    List {
        /// Attribute filter KEY=PATTERN[,PATTERN...]
        #[arg(long = "filter", short = 'f', value_name = "KEY=PATTERNS")]
        filters: Vec<String>,
    },
}

#[derive(Serialize)]
struct TemplateRow {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synopsis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    broken: Option<String>,
}

impl From<&Record<TemplateMetadata>> for TemplateRow {
    fn from(record: &Record<TemplateMetadata>) -> Self {
        let doc = record.document();
        Self {
            id: record.id.clone(),
            name: doc.map(|d| d.name.clone()),
            synopsis: doc.map(|d| d.synopsis.clone()),
            broken: record.loaded.broken().map(|b| b.reason.to_string()),
        }
    }
}

impl fmt::Display for TemplateRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.broken.is_some() {
            return write!(f, "{:<38} BROKEN", self.id);
        }
        write!(
            f,
            "{:<38} {:<24} {}",
            self.id,
            cell(self.name.as_deref()),
            cell(self.synopsis.as_deref())
        )
    }
}

pub fn handle(
    engine: &CliEngine,
    command: TemplateCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        TemplateCommand::List { filters } => {
            let matcher = super::matcher(&filters)?;
            let templates = engine
                .catalog()
                .list_templates(&matcher)
                .map_err(BjError::store)?;
            let rows: Vec<TemplateRow> = templates.iter().map(TemplateRow::from).collect();
            let header = format!("{:<38} {:<24} {}", "ID", "NAME", "SYNOPSIS");
            output::print_list(&rows, &header, "No templates", format);
        }
    }
    Ok(())
}
