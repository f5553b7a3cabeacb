// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-time validation and scheduler boundary behaviour.

use serde_json::Value;
use std::sync::Arc;
use sunset_logging::StructuredLogger;
use sunset_workflow::{
    BuildError, StepContext, StepFuture, WorkflowBuilder, WorkflowConfig, WorkflowContext,
    WorkflowStatus,
};

fn noop(_ctx: StepContext) -> StepFuture {
    Box::pin(async move { Ok(Value::Null) })
}

fn context() -> Arc<WorkflowContext> {
    Arc::new(WorkflowContext::new(StructuredLogger::new("spec-validation")))
}

#[test]
fn two_step_cycle_is_rejected_naming_both_edges() {
    let err = WorkflowBuilder::new("cycle")
        .custom_step("A", "a", noop, Value::Null, &["B"])
        .custom_step("B", "b", noop, Value::Null, &["A"])
        .build()
        .unwrap_err();

    match err {
        BuildError::Cycle { ids } => {
            assert!(ids.contains(&"A".to_string()), "diagnostic: {ids:?}");
            assert!(ids.contains(&"B".to_string()), "diagnostic: {ids:?}");
        }
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn zero_step_timeout_is_rejected_at_build_time() {
    let err = WorkflowBuilder::new("timeouts")
        .step(
            sunset_workflow::WorkflowStep::new(
                "t",
                "t",
                sunset_workflow::StepKind::Custom { func: noop },
            )
            .timeout(std::time::Duration::ZERO),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::ZeroTimeout(id) if id == "t"));
}

#[tokio::test]
async fn serial_limit_produces_identical_outcomes() {
    let build = |parallel: usize| {
        WorkflowBuilder::new("bounds")
            .with_config(WorkflowConfig::new("bounds").max_parallel_steps(parallel))
            .custom_step("a", "a", noop, Value::Null, &[])
            .custom_step("b", "b", noop, Value::Null, &[])
            .custom_step("c", "c", noop, Value::Null, &["a", "b"])
            .build()
            .unwrap()
    };

    let serial = build(1).execute(context()).await;
    let parallel = build(4).execute(context()).await;

    assert_eq!(serial.status, WorkflowStatus::Completed);
    assert_eq!(parallel.status, WorkflowStatus::Completed);
    for id in ["a", "b", "c"] {
        assert_eq!(
            serial.step_results[id].is_completed(),
            parallel.step_results[id].is_completed()
        );
    }
}

#[tokio::test]
async fn outcome_counts_always_partition_the_steps() {
    fn fails(_ctx: StepContext) -> StepFuture {
        Box::pin(async move { Err(sunset_workflow::StepError::failed("boom")) })
    }

    let workflow = WorkflowBuilder::new("partition")
        .with_config(WorkflowConfig::new("partition").default_retry_count(0))
        .custom_step("ok", "ok", noop, Value::Null, &[])
        .custom_step("bad", "bad", fails, Value::Null, &[])
        .custom_step("child", "child", noop, Value::Null, &["bad"])
        .build()
        .unwrap();

    let result = workflow.execute(context()).await;
    assert_eq!(
        result.completed_count() + result.failed_count() + result.skipped_count(),
        3
    );
    assert_eq!(result.status, WorkflowStatus::Partial);
}
