// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn settings() -> PipelineSettings {
    PipelineSettings::new(
        "postgres_air",
        vec!["https://github.com/acme/payments".to_string()],
    )
}

#[test]
fn pr_body_lists_per_file_outcomes() {
    let mut result = RepositoryResult::new("https://github.com/acme/payments");
    result.discovery_summary = "2 matches across 2 files".into();
    result.file_results.push(FileProcessingResult::succeeded(
        "app/db.py",
        vec!["py-raise".into(), "header".into()],
        12,
    ));
    result
        .file_results
        .push(FileProcessingResult::failed("bin/blob", "not UTF-8"));

    let body = pr_body(&settings(), &result);
    assert!(body.contains("`postgres_air`"));
    assert!(body.contains("| app/db.py | py-raise, header | 12 | ok |"));
    assert!(body.contains("| bin/blob |  | 0 | failed |"));
    assert!(body.contains("revert this branch"));
}

#[test]
fn chat_text_includes_counts_and_pr() {
    let mut result = RepositoryResult::new("https://github.com/acme/payments");
    result.files_matched = 4;
    result.files_modified = 4;
    result.pr_url = Some("https://github.com/acme/payments/pull/7".into());

    let text = chat_text(&settings(), &result);
    assert!(text.contains("4 files matched, 4 modified"));
    assert!(text.contains("pull/7"));
    assert!(!text.contains("errors"));
}

#[test]
fn chat_text_reports_errors() {
    let mut result = RepositoryResult::new("https://github.com/acme/payments");
    result.errors.push("boom".into());
    let text = chat_text(&settings(), &result);
    assert!(text.contains("(1 errors)"));
}

#[yare::parameterized(
    live_assignment = { "conn = connect(\"postgres_air\")", 1 },
    hash_comment    = { "# conn = connect(\"postgres_air\")", 0 },
    sql_comment     = { "-- FROM postgres_air", 0 },
    html_comment    = { "<!-- postgres_air -->", 0 },
    raise_line      = { "raise RuntimeError(\"postgres_air was decommissioned\")", 0 },
    guard_def       = { "def connect_to_postgres_air():", 0 },
    unrelated       = { "print('hello')", 0 },
)]
fn live_reference_counting(line: &str, expected: usize) {
    assert_eq!(count_live_references(line, "postgres_air"), expected);
}

#[test]
fn rule_compliance_passes_when_everything_processed() {
    let mut result = RepositoryResult::new("url");
    result.files_matched = 2;
    result.file_results.push(FileProcessingResult::succeeded("a", vec![], 1));
    result.file_results.push(FileProcessingResult::succeeded("b", vec![], 1));

    let check = rule_compliance_check(&[result]);
    assert_eq!(check.status, CheckStatus::Pass);
}

#[test]
fn rule_compliance_fails_on_missing_or_failed_files() {
    let mut missing = RepositoryResult::new("url");
    missing.files_matched = 3;
    missing.file_results.push(FileProcessingResult::succeeded("a", vec![], 1));
    assert_eq!(rule_compliance_check(&[missing]).status, CheckStatus::Fail);

    let mut failed = RepositoryResult::new("url");
    failed.files_matched = 1;
    failed
        .file_results
        .push(FileProcessingResult::failed("a", "rule error"));
    assert_eq!(rule_compliance_check(&[failed]).status, CheckStatus::Fail);
}

#[test]
fn rule_compliance_passes_trivially_with_no_repos() {
    assert_eq!(rule_compliance_check(&[]).status, CheckStatus::Pass);
}
