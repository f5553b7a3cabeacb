// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent workflow construction and validation.

use crate::config::WorkflowConfig;
use crate::engine::Workflow;
use crate::error::BuildError;
use crate::step::{StepFn, StepKind, WorkflowStep};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use sunset_core::WorkflowId;

/// Fluent DAG constructor.
///
/// Steps keep insertion order; at `max_parallel_steps = 1` execution is the
/// topological order with insertion order breaking ties.
pub struct WorkflowBuilder {
    config: WorkflowConfig,
    steps: IndexMap<String, WorkflowStep>,
    duplicate: Option<String>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: WorkflowConfig::new(name),
            steps: IndexMap::new(),
            duplicate: None,
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a fully-specified step.
    pub fn step(mut self, step: WorkflowStep) -> Self {
        if self.steps.contains_key(&step.id) {
            self.duplicate.get_or_insert(step.id.clone());
        }
        self.steps.insert(step.id.clone(), step);
        self
    }

    /// Add a custom step running a named routine.
    pub fn custom_step(
        self,
        id: &str,
        name: &str,
        func: StepFn,
        parameters: Value,
        depends_on: &[&str],
    ) -> Self {
        self.step(
            WorkflowStep::new(id, name, StepKind::Custom { func })
                .parameters(parameters)
                .depends_on(depends_on),
        )
    }

    /// Add a conditional step; a literal `false` result skips dependents.
    pub fn conditional_step(
        self,
        id: &str,
        name: &str,
        func: StepFn,
        parameters: Value,
        depends_on: &[&str],
    ) -> Self {
        self.step(
            WorkflowStep::new(id, name, StepKind::Conditional { func })
                .parameters(parameters)
                .depends_on(depends_on),
        )
    }

    /// Add a direct tool invocation step.
    pub fn tool_step(
        self,
        id: &str,
        name: &str,
        server_name: &str,
        tool_name: &str,
        parameters: Value,
        depends_on: &[&str],
    ) -> Self {
        self.step(
            WorkflowStep::new(
                id,
                name,
                StepKind::Tool {
                    server_name: server_name.to_string(),
                    tool_name: tool_name.to_string(),
                },
            )
            .parameters(parameters)
            .depends_on(depends_on),
        )
    }

    /// Convenience: pack a remote repository via the packer server.
    pub fn pack_repo(self, id: &str, url: &str, depends_on: &[&str]) -> Self {
        self.tool_step(
            id,
            &format!("pack {url}"),
            sunset_clients::PACKER_SERVER,
            "pack_remote_repository",
            json!({"url": url}),
            depends_on,
        )
    }

    /// Convenience: post a chat message via the chat server.
    pub fn post_message(self, id: &str, channel: &str, text: &str, depends_on: &[&str]) -> Self {
        self.tool_step(
            id,
            "post chat message",
            sunset_clients::CHAT_SERVER,
            "post_message",
            json!({"channel_id": channel, "text": text}),
            depends_on,
        )
    }

    /// Validate and freeze the workflow.
    pub fn build(self) -> Result<Workflow, BuildError> {
        if let Some(id) = self.duplicate {
            return Err(BuildError::DuplicateStep(id));
        }
        if self.steps.is_empty() {
            return Err(BuildError::Empty);
        }

        for step in self.steps.values() {
            if step.timeout == Some(std::time::Duration::ZERO) {
                return Err(BuildError::ZeroTimeout(step.id.clone()));
            }
            if let StepKind::Tool {
                server_name,
                tool_name,
            } = &step.kind
            {
                if server_name.is_empty() || tool_name.is_empty() {
                    return Err(BuildError::MissingTool(step.id.clone()));
                }
            }
            for dep in &step.depends_on {
                if !self.steps.contains_key(dep) {
                    return Err(BuildError::UnknownDependency {
                        step: step.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        topological_order(&self.steps)?;

        Ok(Workflow::new(WorkflowId::new(), self.config, self.steps))
    }
}

/// Kahn's algorithm. Returns the full order or the set of ids stuck on a
/// cycle, in insertion order, for the diagnostic.
pub(crate) fn topological_order(
    steps: &IndexMap<String, WorkflowStep>,
) -> Result<Vec<String>, BuildError> {
    let mut in_degree: HashMap<&str, usize> = steps
        .values()
        .map(|s| (s.id.as_str(), s.depends_on.len()))
        .collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in steps.values() {
        for dep in &step.depends_on {
            dependents
                .entry(dep.as_str())
                .or_default()
                .push(step.id.as_str());
        }
    }

    let mut queue: VecDeque<&str> = steps
        .values()
        .filter(|s| s.depends_on.is_empty())
        .map(|s| s.id.as_str())
        .collect();
    let mut order = Vec::with_capacity(steps.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        for dependent in dependents.get(id).into_iter().flatten() {
            let degree = in_degree.entry(dependent).or_insert(0);
            *degree = degree.saturating_sub(1);
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if order.len() == steps.len() {
        Ok(order)
    } else {
        let resolved: BTreeSet<&str> = order.iter().map(String::as_str).collect();
        let ids: Vec<String> = steps
            .keys()
            .filter(|id| !resolved.contains(id.as_str()))
            .cloned()
            .collect();
        Err(BuildError::Cycle { ids })
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
