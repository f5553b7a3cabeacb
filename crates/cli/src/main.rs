// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sunset` — decommission a database across a fleet of repositories.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sunset", version, about = "Automated database decommissioning")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Tool-server configuration file.
    #[arg(long, global = true, default_value = "servers.json")]
    servers_config: PathBuf,

    /// Optional .env-style parameter file.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Optional JSON secrets file.
    #[arg(long, global = true)]
    secrets_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the decommissioning pipeline.
    Run {
        /// The database to decommission.
        #[arg(long)]
        database: String,

        /// Repository URLs (repeatable).
        #[arg(long = "repo", required = true)]
        repos: Vec<String>,

        /// Chat channel for notifications.
        #[arg(long)]
        channel: Option<String>,

        /// Base branch for the decommissioning branch and PR.
        #[arg(long, default_value = "main")]
        base_branch: String,

        /// Use the rule-less fallback processor.
        #[arg(long)]
        fallback: bool,

        /// Decommission date (ISO-8601); defaults to today.
        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        /// JSON-line audit log path.
        #[arg(long, default_value = "dbworkflow.log")]
        log_file: PathBuf,

        /// Disable ANSI colors on the console.
        #[arg(long)]
        no_color: bool,
    },

    /// Validate parameters and tool-server health, then exit.
    Validate,
}

fn main() {
    // Env-filtered diagnostics; the structured audit log is separate.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Command::Run {
                ref database,
                ref repos,
                ref channel,
                ref base_branch,
                fallback,
                date,
                ref log_file,
                no_color,
            } => {
                commands::run(commands::RunArgs {
                    database: database.clone(),
                    repos: repos.clone(),
                    channel: channel.clone(),
                    base_branch: base_branch.clone(),
                    fallback,
                    date,
                    log_file: log_file.clone(),
                    no_color,
                    servers_config: cli.servers_config.clone(),
                    env_file: cli.env_file.clone(),
                    secrets_file: cli.secrets_file.clone(),
                })
                .await
            }
            Command::Validate => {
                commands::validate(
                    cli.servers_config.clone(),
                    cli.env_file.clone(),
                    cli.secrets_file.clone(),
                )
                .await
            }
        }
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e.message);
            std::process::exit(e.code);
        }
    }
}
