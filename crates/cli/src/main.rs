// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj - batch job lifecycle CLI

mod commands;
mod error;
mod output;

use anyhow::Result;
use bj_adapters::ScriptSchedulerAdapter;
use bj_core::{Config, SystemClock, UuidIdGen};
use bj_engine::Engine;
use clap::{Parser, Subcommand};
use commands::{job, poll, script, template};
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::BjError;

/// Environment variable holding the log filter
const LOG_ENV: &str = "BJ_LOG";

pub(crate) type CliEngine = Engine<ScriptSchedulerAdapter, SystemClock, UuidIdGen>;

#[derive(Parser)]
#[command(name = "bj", version, about = "bj - Batch job lifecycle and metadata engine")]
struct Cli {
    /// Config file (defaults to $BJ_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Job management
    Job(job::JobArgs),
    /// Script catalog
    Script(script::ScriptArgs),
    /// Template catalog
    Template(template::TemplateArgs),
    /// Settle and monitor every active job
    Poll(poll::PollArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<BjError>() {
                Some(bj) => eprint!("{}", bj),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref()).map_err(BjError::config)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "loaded config");
    let engine = Engine::new(
        &config,
        ScriptSchedulerAdapter::new(config.adapter.clone()),
        SystemClock,
        UuidIdGen,
    );

    match cli.command {
        Commands::Job(args) => job::handle(&engine, args.command, cli.output).await,
        Commands::Script(args) => script::handle(&engine, args.command, cli.output),
        Commands::Template(args) => template::handle(&engine, args.command, cli.output),
        Commands::Poll(args) => poll::handle(&engine, args, cli.output).await,
    }
}
