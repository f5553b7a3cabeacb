// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline assembly: the 4-step decommissioning workflow.

use crate::qa::QaReport;
use crate::settings::PipelineSettings;
use crate::steps;
use serde_json::json;
use std::sync::Arc;
use sunset_core::{ConfigError, ParameterConfig, ParameterService, RepositoryResult};
use sunset_workflow::{
    BuildError, CancellationToken, Workflow, WorkflowBuilder, WorkflowConfig, WorkflowContext,
    WorkflowResult, WorkflowStatus,
};

/// Host token is the only hard requirement; chat is advisory.
pub const REQUIRED_PARAMETERS: &[&str] = &["GITHUB_TOKEN"];
pub const OPTIONAL_PARAMETERS: &[(&str, &str)] =
    &[("SLACK_BOT_TOKEN", ""), ("CACHE_DIR", ".cache/sunset")];

/// Final report of one pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub result: WorkflowResult,
    pub repositories: Vec<RepositoryResult>,
    pub qa: Option<QaReport>,
    pub chat_failures: u64,
    pub cancelled: bool,
}

impl PipelineOutcome {
    /// Driver exit code: 0 success, 2 partial (some repositories failed),
    /// 3 cancelled. Configuration errors exit 1 before a run ever starts.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            return 3;
        }
        let repos_failed = self.repositories.iter().any(|r| !r.is_clean());
        if self.result.status != WorkflowStatus::Completed || repos_failed {
            2
        } else {
            0
        }
    }
}

/// Builds and runs the concrete decommissioning pipeline.
pub struct DecommissionWorkflow {
    settings: PipelineSettings,
}

impl DecommissionWorkflow {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Resolve the ambient environment (fatal on missing requirements).
    pub fn resolve_environment(
        service: &ParameterService,
    ) -> Result<ParameterConfig, ConfigError> {
        ParameterConfig::resolve(service, REQUIRED_PARAMETERS, OPTIONAL_PARAMETERS)
    }

    /// Compose the 4-step workflow.
    ///
    /// The steps chain linearly; `process_repositories` never fails the
    /// step itself (repository errors are data, not control flow), so the
    /// QA step always runs over whatever accumulated — including when
    /// `stop_on_error` is set.
    pub fn build(&self, environment: &ParameterConfig) -> Result<Workflow, BuildError> {
        let settings = serde_json::to_value(&self.settings)
            .unwrap_or_else(|_| unreachable!("settings are always serializable"));
        let environment_snapshot = json!({
            "parameter_count": environment.parameter_count(),
            "secret_count": environment.secret_count(),
            "entries": environment.display_entries(),
        });

        WorkflowBuilder::new(format!("decommission-{}", self.settings.database))
            .with_config(
                WorkflowConfig::new(format!("decommission-{}", self.settings.database))
                    .description(format!(
                        "decommission {} across {} repositories",
                        self.settings.database,
                        self.settings.repo_urls.len()
                    ))
                    .max_parallel_steps(4)
                    .default_retry_count(0),
            )
            .custom_step(
                "validate_environment",
                "validate environment",
                steps::validate_environment,
                json!({"settings": settings, "environment": environment_snapshot}),
                &[],
            )
            .custom_step(
                "process_repositories",
                "process repositories",
                steps::process_repositories,
                json!({"settings": settings}),
                &["validate_environment"],
            )
            .custom_step(
                "quality_assurance",
                "quality assurance",
                steps::quality_assurance,
                json!({"settings": settings}),
                &["process_repositories"],
            )
            .custom_step(
                "workflow_summary",
                "workflow summary",
                steps::workflow_summary,
                json!({"settings": settings}),
                &["quality_assurance"],
            )
            .build()
    }

    /// Execute against a prepared context (logger + client registry).
    pub async fn run(
        &self,
        environment: &ParameterConfig,
        context: Arc<WorkflowContext>,
        cancel: CancellationToken,
    ) -> Result<PipelineOutcome, BuildError> {
        let workflow = self.build(environment)?;
        let result = workflow
            .execute_with_cancel(Arc::clone(&context), cancel.clone())
            .await;

        let repositories: Vec<RepositoryResult> = context
            .shared_with_prefix("repos/")
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value(value).ok())
            .collect();
        let qa = context
            .step_result("quality_assurance")
            .and_then(|value| serde_json::from_value(value).ok());
        let chat_failures = context
            .shared("chat/failures")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        Ok(PipelineOutcome {
            result,
            repositories,
            qa,
            chat_failures,
            cancelled: cancel.is_cancelled(),
        })
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
