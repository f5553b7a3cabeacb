// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-repository happy path and the no-match case.

use crate::prelude::*;
use sunset_workflow::WorkflowStatus;

const ONE_FILE_ARCHIVE: &str = r#"<repository url="https://github.com/acme/payments">
<file path="app/db.py"><![CDATA[conn = connect("postgres_air")
]]></file>
</repository>
"#;

#[tokio::test]
async fn one_python_file_gets_a_raise_and_a_pr() {
    let spec = Spec::new("postgres_air", ONE_FILE_ARCHIVE).await;
    let outcome = spec.run().await;

    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert!((outcome.result.success_rate - 100.0).abs() < f64::EPSILON);
    assert_eq!(outcome.exit_code(), 0);

    let repo = &outcome.repositories[0];
    assert_eq!(repo.files_matched, 1);
    assert_eq!(repo.files_modified, 1);
    assert!(repo
        .branch
        .as_deref()
        .unwrap()
        .starts_with("decommission-postgres_air-"));
    assert_eq!(repo.pr_url.as_deref(), Some("https://github.com/acme/payments/pull/7"));

    let committed = spec.committed_files();
    let content = &committed["app/db.py"];
    assert!(content.contains("def connect_to_postgres_air():"));
    assert!(content.contains("raise RuntimeError(\"postgres_air was decommissioned on 2026-08-01"));
    assert!(content.contains("# conn = connect(\"postgres_air\")"));
    // Header exactly once, at the top.
    assert!(content.lines().next().unwrap().contains("DECOMMISSIONED"));
    assert_eq!(content.matches("DECOMMISSIONED").count(), 1);
}

#[tokio::test]
async fn unknown_database_touches_nothing() {
    let spec = Spec::new("nonexistent", ONE_FILE_ARCHIVE).await;
    let outcome = spec.run().await;

    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert_eq!(outcome.exit_code(), 0);

    let repo = &outcome.repositories[0];
    assert_eq!(repo.files_matched, 0);
    assert_eq!(repo.files_modified, 0);
    assert!(repo.branch.is_none());
    assert!(repo.pr_url.is_none());
    assert!(spec.fake.tool_calls("create_branch").is_empty());
    assert!(spec.fake.tool_calls("create_or_update_file").is_empty());
    assert!(spec.fake.tool_calls("create_pull_request").is_empty());

    // QA passes trivially when nothing changed.
    let qa = outcome.qa.unwrap();
    assert!(!qa.has_failures());
    assert!((qa.score() - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn audit_log_round_trips_and_redacts() {
    let spec = Spec::new("postgres_air", ONE_FILE_ARCHIVE).await;
    spec.run().await;

    let entries = spec.log_entries();
    assert!(!entries.is_empty());

    // Every line parsed back (the reader skips nothing on a healthy run),
    // and the secret never reached the sink in plaintext.
    let raw = std::fs::read_to_string(&spec.log_path).unwrap();
    assert_eq!(raw.lines().count(), entries.len());
    assert!(!raw.contains("ghp_spec_abcdefghijklmnop"));

    // The environment summary follows the one-line console policy; the
    // file carries the full dump as well.
    assert!(entries
        .iter()
        .any(|e| e.message.contains("Environment validated")));
    assert!(entries.iter().any(|e| e.message == "environment parameters"));
}

#[tokio::test]
async fn rerunning_on_decommissioned_content_is_idempotent() {
    let spec = Spec::new("postgres_air", ONE_FILE_ARCHIVE).await;
    spec.run().await;
    let committed = spec.committed_files();

    // Feed the decommissioned content back through a second run.
    let archive = format!(
        "<repository url=\"{REPO_URL}\">\n<file path=\"app/db.py\"><![CDATA[{}]]></file>\n</repository>\n",
        committed["app/db.py"]
    );
    let second = Spec::new("postgres_air", &archive).await;
    let outcome = second.run().await;

    // Matches are still reported (the name appears in comments), but no
    // commit and no PR are produced.
    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    assert!(second.fake.tool_calls("create_or_update_file").is_empty());
    assert!(second.fake.tool_calls("create_pull_request").is_empty());
    assert_eq!(outcome.repositories[0].files_modified, 0);
}
