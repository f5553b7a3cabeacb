// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topological scheduler with bounded parallelism.

use crate::config::WorkflowConfig;
use crate::context::{StepContext, WorkflowContext};
use crate::error::StepError;
use crate::result::{StepOutcome, WorkflowResult, WorkflowStatus};
use crate::step::{StepKind, WorkflowStep};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use sunset_clients::RetryPolicy;
use sunset_core::{ExecutionId, WorkflowId};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A validated, executable DAG of steps.
#[derive(Debug)]
pub struct Workflow {
    id: WorkflowId,
    config: WorkflowConfig,
    steps: IndexMap<String, WorkflowStep>,
}

impl Workflow {
    pub(crate) fn new(
        id: WorkflowId,
        config: WorkflowConfig,
        steps: IndexMap<String, WorkflowStep>,
    ) -> Self {
        Self { id, config, steps }
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn step_ids(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Execute to completion.
    pub async fn execute(&self, context: Arc<WorkflowContext>) -> WorkflowResult {
        self.execute_with_cancel(context, CancellationToken::new())
            .await
    }

    /// Execute with external cancellation.
    ///
    /// On cancellation the engine stops admitting steps, waits for the
    /// in-flight cohort to settle, marks the remainder skipped, and returns
    /// a `partial` result.
    pub async fn execute_with_cancel(
        &self,
        context: Arc<WorkflowContext>,
        cancel: CancellationToken,
    ) -> WorkflowResult {
        let execution_id = ExecutionId::new();
        let started = Instant::now();
        let logger = context.logger().clone();
        logger.info(
            "workflow",
            &format!(
                "executing {} ({} steps, max {} parallel)",
                self.config.name,
                self.steps.len(),
                self.config.max_parallel_steps
            ),
        );

        let mut outcomes: HashMap<String, StepOutcome> = HashMap::new();
        let mut pending: Vec<String> = self.steps.keys().cloned().collect();
        let mut forced_skips: HashSet<String> = HashSet::new();
        let mut admitted_without_outcome: HashSet<String> = HashSet::new();
        let mut tasks: JoinSet<StepRun> = JoinSet::new();
        let mut aborted = false;
        let mut admission_index = 0usize;
        let mut step_indices: HashMap<String, usize> = HashMap::new();

        loop {
            propagate_skips(&self.steps, &mut pending, &mut outcomes, &forced_skips);

            if !aborted && !cancel.is_cancelled() {
                let ready: Vec<String> = pending
                    .iter()
                    .filter(|id| self.is_ready(id, &outcomes))
                    .cloned()
                    .collect();
                for id in ready {
                    if tasks.len() >= self.config.max_parallel_steps {
                        break;
                    }
                    pending.retain(|p| p != &id);
                    admitted_without_outcome.insert(id.clone());
                    step_indices.insert(id.clone(), admission_index);
                    logger.log_step_start(admission_index, &id);
                    admission_index += 1;

                    let step = match self.steps.get(&id) {
                        Some(step) => step.clone(),
                        None => continue,
                    };
                    let timeout = step.timeout.unwrap_or(self.config.default_timeout);
                    let retries = step.retry_count.unwrap_or(self.config.default_retry_count);
                    let ctx = Arc::clone(&context);
                    let token = cancel.clone();
                    tasks.spawn(async move { run_step(step, ctx, token, timeout, retries).await });
                }
            }

            let joined = match tasks.join_next().await {
                Some(joined) => joined,
                None => break,
            };

            match joined {
                Ok(StepRun {
                    id,
                    result,
                    retries,
                    duration_ms,
                }) => {
                    admitted_without_outcome.remove(&id);
                    let step_index = step_indices.get(&id).copied().unwrap_or(0);
                    match result {
                        Ok(output) => {
                            context.record_step_result(&id, output.clone());
                            if self.is_conditional(&id) && output == Value::Bool(false) {
                                for dependent in self.direct_dependents(&id) {
                                    forced_skips.insert(dependent);
                                }
                            }
                            logger.log_step_complete(step_index, &id, duration_ms, true);
                            outcomes.insert(
                                id,
                                StepOutcome::Completed {
                                    output,
                                    duration_ms,
                                },
                            );
                        }
                        Err(error) => {
                            logger.error(
                                "workflow",
                                &format!("step failed: {id}"),
                                Some(serde_json::json!({
                                    "step_id": id,
                                    "error": error.to_string(),
                                    "retries": retries,
                                })),
                            );
                            logger.log_step_complete(step_index, &id, duration_ms, false);
                            outcomes.insert(
                                id,
                                StepOutcome::Failed {
                                    error: error.to_string(),
                                    retries,
                                },
                            );
                            if self.config.stop_on_error {
                                aborted = true;
                            }
                        }
                    }
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "step task aborted");
                    aborted = true;
                }
            }
        }

        // Anything admitted but never reported died with its task.
        for id in admitted_without_outcome {
            outcomes.insert(
                id,
                StepOutcome::Failed {
                    error: "step task aborted".to_string(),
                    retries: 0,
                },
            );
        }

        // Anything never admitted was starved by abort or cancellation.
        let leftover_reason = if cancel.is_cancelled() {
            "workflow cancelled"
        } else {
            "workflow aborted"
        };
        for id in pending {
            outcomes.entry(id).or_insert(StepOutcome::Skipped {
                reason: leftover_reason.to_string(),
            });
        }

        let total = self.steps.len().max(1);
        let completed = outcomes.values().filter(|o| o.is_completed()).count();
        let failed = outcomes.values().filter(|o| o.is_failed()).count();
        let status = if cancel.is_cancelled() && completed < self.steps.len() {
            WorkflowStatus::Partial
        } else if failed == 0 && completed == self.steps.len() {
            WorkflowStatus::Completed
        } else if failed > 0 && self.config.stop_on_error {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Partial
        };

        let result = WorkflowResult {
            workflow_id: execution_id,
            status,
            duration_seconds: started.elapsed().as_secs_f64(),
            success_rate: completed as f64 / total as f64 * 100.0,
            step_results: outcomes,
        };
        logger.info(
            "workflow",
            &format!(
                "{} {}: {}/{} steps completed ({:.1}%)",
                self.config.name,
                result.status,
                completed,
                self.steps.len(),
                result.success_rate
            ),
        );
        result
    }

    fn is_ready(&self, id: &str, outcomes: &HashMap<String, StepOutcome>) -> bool {
        self.steps
            .get(id)
            .map(|step| {
                step.depends_on.iter().all(|dep| {
                    outcomes
                        .get(dep)
                        .map(StepOutcome::is_completed)
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }

    fn is_conditional(&self, id: &str) -> bool {
        matches!(
            self.steps.get(id).map(|s| &s.kind),
            Some(StepKind::Conditional { .. })
        )
    }

    fn direct_dependents(&self, id: &str) -> Vec<String> {
        self.steps
            .values()
            .filter(|s| s.depends_on.contains(id))
            .map(|s| s.id.clone())
            .collect()
    }
}

/// Mark steps whose dependencies failed or were skipped, cascading.
fn propagate_skips(
    steps: &IndexMap<String, WorkflowStep>,
    pending: &mut Vec<String>,
    outcomes: &mut HashMap<String, StepOutcome>,
    forced_skips: &HashSet<String>,
) {
    loop {
        let mut changed = false;
        let mut still_pending = Vec::with_capacity(pending.len());
        for id in pending.iter() {
            let reason = skip_reason(steps, id, outcomes, forced_skips);
            match reason {
                Some(reason) => {
                    outcomes.insert(id.clone(), StepOutcome::Skipped { reason });
                    changed = true;
                }
                None => still_pending.push(id.clone()),
            }
        }
        *pending = still_pending;
        if !changed {
            break;
        }
    }
}

fn skip_reason(
    steps: &IndexMap<String, WorkflowStep>,
    id: &str,
    outcomes: &HashMap<String, StepOutcome>,
    forced_skips: &HashSet<String>,
) -> Option<String> {
    if forced_skips.contains(id) {
        return Some("condition not met".to_string());
    }
    let step = steps.get(id)?;
    for dep in &step.depends_on {
        match outcomes.get(dep) {
            Some(StepOutcome::Failed { .. }) => {
                return Some(format!("dependency {dep} failed"));
            }
            Some(StepOutcome::Skipped { .. }) => {
                return Some(format!("dependency {dep} skipped"));
            }
            _ => {}
        }
    }
    None
}

/// Terminal report from one step task.
struct StepRun {
    id: String,
    result: Result<Value, StepError>,
    retries: u32,
    duration_ms: u64,
}

/// Run one step to a terminal result: retries with the shared backoff
/// shape, a per-attempt timeout, and cooperative cancellation.
async fn run_step(
    step: WorkflowStep,
    context: Arc<WorkflowContext>,
    cancel: CancellationToken,
    timeout: std::time::Duration,
    retries: u32,
) -> StepRun {
    let started = Instant::now();
    let report = |result: Result<Value, StepError>, retries_used: u32| StepRun {
        id: step.id.clone(),
        result,
        retries: retries_used,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    if !step.delay.is_zero() {
        tokio::time::sleep(step.delay).await;
    }

    let policy = RetryPolicy::default().max_retries(retries);
    let mut retries_used = 0;

    for attempt in 1..=policy.attempts() {
        if attempt > 1 {
            retries_used += 1;
            let delay = policy.delay_for_retry(attempt - 1);
            context.logger().warning(
                "workflow",
                &format!("retrying step {} (attempt {attempt})", step.id),
            );
            tokio::time::sleep(delay).await;
        }
        if cancel.is_cancelled() {
            return report(Err(StepError::Cancelled), retries_used);
        }

        let attempt_future = invoke(&step, &context, &cancel);
        let result = match tokio::time::timeout(timeout, attempt_future).await {
            Ok(result) => result,
            Err(_) => Err(StepError::Timeout(timeout)),
        };

        match result {
            Ok(value) => return report(Ok(value), retries_used),
            Err(error) if error.is_terminal() || attempt == policy.attempts() => {
                return report(Err(error), retries_used);
            }
            Err(error) => {
                tracing::warn!(step = %step.id, error = %error, "step attempt failed");
            }
        }
    }

    report(Err(StepError::failed("no attempts made")), retries_used)
}

async fn invoke(
    step: &WorkflowStep,
    context: &Arc<WorkflowContext>,
    cancel: &CancellationToken,
) -> Result<Value, StepError> {
    match &step.kind {
        StepKind::Tool {
            server_name,
            tool_name,
        } => {
            let registry = context
                .clients()
                .ok_or_else(|| StepError::failed("no client registry in context"))?;
            let client = registry.client(server_name).await?;
            let response = client.call_tool(tool_name, step.parameters.clone()).await?;
            Ok(response.into_value())
        }
        StepKind::Custom { func } | StepKind::Conditional { func } => {
            let step_context = StepContext {
                step_id: step.id.clone(),
                parameters: step.parameters.clone(),
                context: Arc::clone(context),
                cancel: cancel.clone(),
            };
            func(step_context).await
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
