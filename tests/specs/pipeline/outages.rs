// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Degraded-mode behaviour: chat outages and transport flakes.

use crate::prelude::*;
use serde_json::json;
use sunset_logging::LogLevel;
use sunset_transport::ProtocolError;
use sunset_workflow::WorkflowStatus;

const ARCHIVE: &str = r#"<repository url="https://github.com/acme/payments">
<file path="app/db.py"><![CDATA[conn = connect("postgres_air")
]]></file>
</repository>
"#;

#[tokio::test]
async fn chat_outage_never_blocks_the_pipeline() {
    let mut spec = Spec::new("postgres_air", ARCHIVE).await;
    spec.settings = spec.settings.clone().chat_channel("C-ops");

    // Every chat call is refused.
    for _ in 0..4 {
        spec.fake
            .push_tool_ok("post_message", json!({"ok": false, "error": "service_down"}));
    }

    let outcome = spec.run().await;

    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert!(outcome.chat_failures >= 1);
    assert!(outcome.repositories[0].is_clean());

    // The failures surface as warnings in the audit log, not errors.
    let entries = spec.log_entries();
    assert!(entries
        .iter()
        .any(|e| e.level == LogLevel::Warning && e.message.contains("chat notification failed")));
    assert!(!entries.iter().any(|e| e.level == LogLevel::Error));
}

#[tokio::test]
async fn transport_flake_retries_until_success() {
    let spec = Spec::new("postgres_air", ARCHIVE).await;

    // The host commit times out twice before succeeding.
    spec.fake.push_tool_err(
        "create_or_update_file",
        ProtocolError::Timeout(std::time::Duration::from_secs(1)),
    );
    spec.fake.push_tool_err(
        "create_or_update_file",
        ProtocolError::Timeout(std::time::Duration::from_secs(1)),
    );
    spec.fake
        .push_tool_ok("create_or_update_file", json!({"commit": {"sha": "abc"}}));

    let outcome = spec.run().await;

    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.repositories[0].files_modified, 1);
    // Two failed attempts plus the success.
    assert_eq!(spec.fake.tool_calls("create_or_update_file").len(), 3);
}

#[tokio::test]
async fn persistent_transport_failure_marks_the_repository() {
    let spec = Spec::new("postgres_air", ARCHIVE).await;

    // Branch creation never succeeds (4 attempts: initial + 3 retries).
    for _ in 0..4 {
        spec.fake.push_tool_err(
            "create_branch",
            ProtocolError::Timeout(std::time::Duration::from_secs(1)),
        );
    }

    let outcome = spec.run().await;

    // The workflow completes; the repository result carries the failure.
    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert!(!outcome.repositories[0].is_clean());
    assert_eq!(outcome.exit_code(), 2);
}
