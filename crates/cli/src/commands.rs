// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.

use crate::exit_error::ExitError;
use std::path::PathBuf;
use std::sync::Arc;
use sunset_clients::ClientRegistry;
use sunset_core::{ConfigError, ParameterService};
use sunset_logging::{ConsoleSink, RotatingFileSink, StructuredLogger};
use sunset_pipeline::{DecommissionWorkflow, PipelineSettings};
use sunset_transport::ServersConfig;
use sunset_workflow::{CancellationToken, WorkflowContext};

pub struct RunArgs {
    pub database: String,
    pub repos: Vec<String>,
    pub channel: Option<String>,
    pub base_branch: String,
    pub fallback: bool,
    pub date: Option<chrono::NaiveDate>,
    pub log_file: PathBuf,
    pub no_color: bool,
    pub servers_config: PathBuf,
    pub env_file: Option<PathBuf>,
    pub secrets_file: Option<PathBuf>,
}

fn config_error(e: ConfigError) -> ExitError {
    ExitError::new(1, e.to_string())
}

fn build_service(
    env_file: Option<&PathBuf>,
    secrets_file: Option<&PathBuf>,
) -> Result<ParameterService, ExitError> {
    let mut service = ParameterService::from_env();
    if let Some(path) = env_file {
        service = service.with_dotenv_file(path).map_err(config_error)?;
    }
    if let Some(path) = secrets_file {
        service = service.with_secrets_file(path).map_err(config_error)?;
    }
    Ok(service.mark_secret(&["GITHUB_TOKEN", "SLACK_BOT_TOKEN"]))
}

/// `sunset run`: execute the pipeline and map the outcome to an exit code.
pub async fn run(args: RunArgs) -> Result<i32, ExitError> {
    let service = build_service(args.env_file.as_ref(), args.secrets_file.as_ref())?;
    let environment =
        DecommissionWorkflow::resolve_environment(&service).map_err(config_error)?;
    let servers = ServersConfig::load(&args.servers_config).map_err(config_error)?;

    let mut settings = PipelineSettings::new(args.database.clone(), args.repos.clone())
        .base_branch(args.base_branch.clone())
        .use_fallback(args.fallback);
    if let Some(channel) = &args.channel {
        settings = settings.chat_channel(channel.clone());
    }
    if let Some(date) = args.date {
        settings = settings.date(date);
    }

    let logger = StructuredLogger::new(format!("decommission-{}", args.database))
        .with_file_sink(RotatingFileSink::new(&args.log_file))
        .with_console_sink(if args.no_color {
            ConsoleSink::with_writer(Box::new(std::io::stdout()), false)
        } else {
            ConsoleSink::stdout()
        });

    let registry = Arc::new(ClientRegistry::new(servers));
    let context = Arc::new(WorkflowContext::new(logger));
    context.set_clients(Arc::clone(&registry));

    // Ctrl-C: stop admitting steps, drain the cohort, exit 3.
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling workflow");
            ctrl_c_token.cancel();
        }
    });

    let pipeline = DecommissionWorkflow::new(settings);
    let outcome = pipeline
        .run(&environment, Arc::clone(&context), cancel)
        .await
        .map_err(|e| ExitError::new(1, format!("workflow build failed: {e}")))?;

    registry
        .shutdown_all(std::time::Duration::from_secs(2))
        .await;

    for repo in &outcome.repositories {
        let verdict = if repo.is_clean() { "ok" } else { "errors" };
        println!(
            "{}: {} matched, {} modified, {} [{}]",
            repo.repo_url,
            repo.files_matched,
            repo.files_modified,
            repo.pr_url.as_deref().unwrap_or("no PR"),
            verdict,
        );
    }
    println!(
        "{}: {:.1}% steps, {} chat failures",
        outcome.result.status, outcome.result.success_rate, outcome.chat_failures,
    );

    Ok(outcome.exit_code())
}

/// `sunset validate`: resolve parameters and probe servers, then exit.
pub async fn validate(
    servers_config: PathBuf,
    env_file: Option<PathBuf>,
    secrets_file: Option<PathBuf>,
) -> Result<i32, ExitError> {
    let service = build_service(env_file.as_ref(), secrets_file.as_ref())?;
    let environment =
        DecommissionWorkflow::resolve_environment(&service).map_err(config_error)?;
    let servers = ServersConfig::load(&servers_config).map_err(config_error)?;

    let logger = StructuredLogger::new("validate").with_console_sink(ConsoleSink::stdout());
    let registry = ClientRegistry::new(servers);
    let health = registry.health_snapshot().await;
    logger.log_environment(&environment, &health);
    registry
        .shutdown_all(std::time::Duration::from_secs(2))
        .await;

    let all_healthy = health.iter().all(|(_, ok)| *ok);
    Ok(if all_healthy { 0 } else { 1 })
}
