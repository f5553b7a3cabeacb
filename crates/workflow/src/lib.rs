// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative workflow DAGs with a bounded-parallel topological scheduler.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod builder;
mod config;
mod context;
mod engine;
mod error;
mod result;
mod step;

pub use builder::WorkflowBuilder;
pub use config::WorkflowConfig;
pub use context::{StepContext, WorkflowContext};
pub use engine::Workflow;
pub use error::{BuildError, StepError};
pub use result::{StepOutcome, WorkflowResult, WorkflowStatus};
pub use step::{StepFn, StepFuture, StepKind, WorkflowStep};

pub use tokio_util::sync::CancellationToken;
