// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step bodies for the decommissioning pipeline.
//!
//! All bodies are module-scope functions; everything they need arrives via
//! the step parameters map and the shared workflow context.

use crate::qa::{CheckStatus, QaCheck, QaReport};
use crate::settings::PipelineSettings;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use sunset_clients::{ChatClient, ClientRegistry, HostClient, RepoRef};
use sunset_core::{FileProcessingResult, RepositoryResult};
use sunset_logging::{Payload, ProgressStatus, TableData};
use sunset_rules::{
    branch_name, ContextualRulesEngine, DatabaseReferenceExtractor, FileDecommissionProcessor,
    PackedArchive, PatternDiscoveryEngine,
};
use sunset_workflow::{StepContext, StepError, StepFuture};

const CHAT_FAILURES_KEY: &str = "chat/failures";
const REPO_RESULT_PREFIX: &str = "repos/";

fn settings_from(ctx: &StepContext) -> Result<PipelineSettings, StepError> {
    let value = ctx
        .parameters()
        .get("settings")
        .cloned()
        .ok_or_else(|| StepError::failed("missing settings parameter"))?;
    serde_json::from_value(value).map_err(|e| StepError::failed(format!("bad settings: {e}")))
}

fn registry_from(ctx: &StepContext) -> Result<Arc<ClientRegistry>, StepError> {
    ctx.context()
        .clients()
        .ok_or_else(|| StepError::failed("no client registry in context"))
}

/// Accumulated repository results, in repository order.
pub(crate) fn collect_repo_results(ctx: &StepContext) -> Vec<RepositoryResult> {
    ctx.context()
        .shared_with_prefix(REPO_RESULT_PREFIX)
        .into_iter()
        .filter_map(|(_, value)| serde_json::from_value(value).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Step 1: validate_environment
// ---------------------------------------------------------------------------

/// Resolve the environment summary, probe every configured server, and emit
/// the one-line console summary plus the file-only parameter dump.
pub fn validate_environment(ctx: StepContext) -> StepFuture {
    Box::pin(async move {
        let settings = settings_from(&ctx)?;
        let registry = registry_from(&ctx)?;

        let parameter_count = ctx
            .parameters()
            .pointer("/environment/parameter_count")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;
        let secret_count = ctx
            .parameters()
            .pointer("/environment/secret_count")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;
        let entries: Vec<(String, String)> = ctx
            .parameters()
            .pointer("/environment/entries")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let health = registry.health_snapshot().await;
        for (server, healthy) in &health {
            if !healthy {
                ctx.logger().warning(
                    "environment",
                    &format!("server {server} failed its health probe"),
                );
            }
        }
        ctx.logger()
            .log_environment_snapshot(parameter_count, secret_count, &entries, &health);

        Ok(json!({
            "database": settings.database,
            "repositories": settings.repo_urls.len(),
            "servers": health
                .iter()
                .map(|(name, ok)| (name.clone(), json!(ok)))
                .collect::<serde_json::Map<_, _>>(),
        }))
    })
}

// ---------------------------------------------------------------------------
// Step 2: process_repositories
// ---------------------------------------------------------------------------

/// Pack, discover, rewrite, commit, PR and notify — one repository at a
/// time. Repository failures are recorded, never fatal to the step.
pub fn process_repositories(ctx: StepContext) -> StepFuture {
    Box::pin(async move {
        let settings = settings_from(&ctx)?;
        let registry = registry_from(&ctx)?;
        let total = settings.repo_urls.len() as u64;

        ctx.logger().start_step("process_repositories", Some(total));

        let mut files_modified_total = 0usize;
        let mut failed_repos = 0usize;

        for (index, url) in settings.repo_urls.iter().enumerate() {
            let result = process_one_repository(&ctx, &registry, &settings, url).await;
            files_modified_total += result.files_modified;
            if !result.is_clean() {
                failed_repos += 1;
            }
            match serde_json::to_value(&result) {
                Ok(value) => ctx
                    .context()
                    .set_shared(&format!("{REPO_RESULT_PREFIX}{index:04}/result"), value),
                Err(e) => tracing::warn!(error = %e, "repository result not serializable"),
            }
            ctx.logger()
                .update_progress("process_repositories", (index + 1) as u64);
        }

        let status = if failed_repos == 0 {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Failed
        };
        ctx.logger().complete_step("process_repositories", status);

        Ok(json!({
            "repositories": settings.repo_urls.len(),
            "failed_repositories": failed_repos,
            "files_modified": files_modified_total,
        }))
    })
}

async fn process_one_repository(
    ctx: &StepContext,
    registry: &ClientRegistry,
    settings: &PipelineSettings,
    url: &str,
) -> RepositoryResult {
    let mut result = RepositoryResult::new(url);
    let logger = ctx.logger();
    logger.info("pipeline", &format!("processing {url}"));

    let repo = match RepoRef::parse_url(url) {
        Ok(repo) => repo,
        Err(e) => {
            result.errors.push(e.to_string());
            return result;
        }
    };

    let packer = match registry.packer().await {
        Ok(packer) => packer,
        Err(e) => {
            result.errors.push(format!("packer unavailable: {e}"));
            return result;
        }
    };
    let host = match registry.host().await {
        Ok(host) => host,
        Err(e) => {
            result.errors.push(format!("host unavailable: {e}"));
            return result;
        }
    };

    let pack = match packer.pack_remote_repository(url, None, None).await {
        Ok(pack) => pack,
        Err(e) => {
            result.errors.push(format!("pack failed: {e}"));
            return result;
        }
    };

    let archive = match PackedArchive::load(Path::new(&pack.archive_path)) {
        Ok(archive) => archive,
        Err(e) => {
            result.errors.push(format!("archive unreadable: {e}"));
            return result;
        }
    };

    // Quarantine copies for offline inspection.
    let extractor = DatabaseReferenceExtractor::new(&settings.database)
        .with_quarantine_root(settings.quarantine_root.clone());
    if let Err(e) = extractor.extract(&archive) {
        logger.warning("pipeline", &format!("quarantine extraction failed: {e}"));
    }

    let discovery = PatternDiscoveryEngine::new(&settings.database);
    let (matched, summary) = discovery.discover(&archive);
    result.files_matched = matched.len();
    result.discovery_summary = summary.one_line();
    logger.log_tree(
        "discovery",
        &Payload::Tree {
            title: format!("{url}: {}", result.discovery_summary),
            roots: vec![sunset_logging::TreeNode::branch(
                repo.to_string(),
                matched
                    .iter()
                    .map(|f| sunset_logging::TreeNode::leaf(&f.original_path))
                    .collect(),
            )],
        },
    );

    if matched.is_empty() {
        notify(ctx, registry, settings, &format!(
            "No references to `{}` found in {url}; nothing to do.",
            settings.database
        ))
        .await;
        return result;
    }

    let branch = branch_name(&settings.database, url);
    if let Err(e) = host
        .create_branch(&repo, &settings.base_branch, &branch)
        .await
    {
        result.errors.push(format!("create branch failed: {e}"));
        return result;
    }
    result.branch = Some(branch.clone());

    let options = settings.decommission_options();
    let engine = ContextualRulesEngine::new(options.clone());
    let fallback = FileDecommissionProcessor::new(options);

    for file in &matched {
        let Some(entry) = archive.get(&file.original_path) else {
            result.file_results.push(FileProcessingResult::failed(
                file.original_path.clone(),
                "file missing from archive",
            ));
            continue;
        };

        let file_result = if settings.use_fallback {
            let (new_content, lines_changed) =
                fallback.transform_content(Path::new(&file.original_path), &entry.content);
            if lines_changed == 0 {
                FileProcessingResult::succeeded(file.original_path.clone(), vec![], 0)
            } else {
                commit_content(
                    &host,
                    &repo,
                    &branch,
                    &file.original_path,
                    &new_content,
                    &format!(
                        "decommission(fallback): remove {} references from {}",
                        settings.database, file.original_path
                    ),
                    vec!["fallback".to_string()],
                    lines_changed,
                )
                .await
            }
        } else {
            match engine.apply_to_file(file, &entry.content) {
                Ok(processed) if processed.changed => {
                    match engine.commit_file(&host, &repo, &branch, &processed).await {
                        Ok(_) => processed.result,
                        Err(e) => FileProcessingResult::failed(
                            file.original_path.clone(),
                            format!("commit failed: {e}"),
                        ),
                    }
                }
                Ok(processed) => processed.result,
                Err(e) => {
                    logger.warning(
                        "rules",
                        &format!("rule application failed for {}: {e}", file.original_path),
                    );
                    FileProcessingResult::failed(file.original_path.clone(), e.to_string())
                }
            }
        };

        if !file_result.success {
            result.errors.push(format!(
                "{}: {}",
                file_result.original_path,
                file_result.error.clone().unwrap_or_default()
            ));
        } else if file_result.lines_changed_count > 0 {
            result.files_modified += 1;
        }
        result.file_results.push(file_result);
    }

    if result.files_modified > 0 {
        let title = format!("Decommission {} ({})", settings.database, repo);
        let body = pr_body(settings, &result);
        match host
            .create_pull_request(&repo, &title, &branch, &settings.base_branch, &body)
            .await
        {
            Ok(pr_url) => result.pr_url = Some(pr_url),
            Err(e) => result.errors.push(format!("pull request failed: {e}")),
        }
    }

    let text = chat_text(settings, &result);
    notify(ctx, registry, settings, &text).await;
    result
}

#[allow(clippy::too_many_arguments)]
async fn commit_content(
    host: &HostClient,
    repo: &RepoRef,
    branch: &str,
    path: &str,
    content: &str,
    message: &str,
    rule_ids: Vec<String>,
    lines_changed: usize,
) -> FileProcessingResult {
    match host
        .create_or_update_file(repo, path, content, message, branch)
        .await
    {
        Ok(_) => FileProcessingResult::succeeded(path, rule_ids, lines_changed),
        Err(e) => FileProcessingResult::failed(path, format!("commit failed: {e}")),
    }
}

/// Post to chat when a channel is configured. Failures are counted into the
/// shared context, never propagated.
async fn notify(
    ctx: &StepContext,
    registry: &ClientRegistry,
    settings: &PipelineSettings,
    text: &str,
) {
    let Some(channel) = &settings.chat_channel else {
        return;
    };
    let chat: ChatClient = match registry.chat().await {
        Ok(chat) => chat,
        Err(e) => {
            record_chat_failure(ctx, &e.to_string());
            return;
        }
    };
    let outcome = chat.post_message(channel, text).await;
    if !outcome.ok {
        record_chat_failure(ctx, outcome.error.as_deref().unwrap_or("unknown"));
    }
}

fn record_chat_failure(ctx: &StepContext, error: &str) {
    let current = ctx
        .context()
        .shared(CHAT_FAILURES_KEY)
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    ctx.context().set_shared(CHAT_FAILURES_KEY, json!(current + 1));
    ctx.logger()
        .warning("chat", &format!("chat notification failed: {error}"));
}

fn pr_body(settings: &PipelineSettings, result: &RepositoryResult) -> String {
    let mut body = format!(
        "Automated decommissioning of `{}`.\n\n{}\n\n| file | rules | lines | outcome |\n|---|---|---|---|\n",
        settings.database, result.discovery_summary,
    );
    for file in &result.file_results {
        body.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            file.original_path,
            file.applied_rule_ids.join(", "),
            file.lines_changed_count,
            if file.success { "ok" } else { "failed" },
        ));
    }
    body.push_str("\nEvery change is commented, not deleted; revert this branch to roll back.\n");
    body
}

fn chat_text(settings: &PipelineSettings, result: &RepositoryResult) -> String {
    let mut text = format!(
        "Decommission `{}` in {}: {} files matched, {} modified.",
        settings.database, result.repo_url, result.files_matched, result.files_modified,
    );
    if let Some(pr) = &result.pr_url {
        text.push_str(&format!(" PR: {pr}"));
    }
    if !result.errors.is_empty() {
        text.push_str(&format!(" ({} errors)", result.errors.len()));
    }
    text
}

// ---------------------------------------------------------------------------
// Step 3: quality_assurance
// ---------------------------------------------------------------------------

/// Three checks over the accumulated results. Always runs, even when a
/// repository failed earlier: whatever was changed deserves auditing.
pub fn quality_assurance(ctx: StepContext) -> StepFuture {
    Box::pin(async move {
        let settings = settings_from(&ctx)?;
        let registry = registry_from(&ctx)?;
        let results = collect_repo_results(&ctx);

        let mut report = QaReport::default();
        report.push(residual_references_check(&registry, &settings, &results).await);
        report.push(rule_compliance_check(&results));
        report.push(service_integrity_check(&registry, &results).await);

        let table = Payload::Table {
            title: "quality assurance".to_string(),
            table: TableData {
                headers: vec!["check".into(), "status".into(), "detail".into()],
                rows: report
                    .checks
                    .iter()
                    .map(|c| vec![c.name.clone(), c.status.to_string(), c.detail.clone()])
                    .collect(),
                metadata: [("score".to_string(), format!("{:.1}", report.score()))]
                    .into_iter()
                    .collect(),
            },
        };
        ctx.logger().log_table("qa", &table);

        serde_json::to_value(&report).map_err(|e| StepError::failed(e.to_string()))
    })
}

/// Re-read every modified file on its decommissioning branch and count
/// lines that still reference the database outside comments.
async fn residual_references_check(
    registry: &ClientRegistry,
    settings: &PipelineSettings,
    results: &[RepositoryResult],
) -> QaCheck {
    let name = "no_residual_references";
    let host = match registry.host().await {
        Ok(host) => host,
        Err(e) => return QaCheck::new(name, CheckStatus::Warning, e.to_string()),
    };

    let mut live_lines = 0usize;
    let mut files_checked = 0usize;
    for result in results {
        let Some(branch) = &result.branch else {
            continue;
        };
        let Ok(repo) = RepoRef::parse_url(&result.repo_url) else {
            continue;
        };
        for file in result.file_results.iter().filter(|f| f.success) {
            if file.lines_changed_count == 0 {
                continue;
            }
            match host
                .get_file_contents(&repo, &file.original_path, Some(branch))
                .await
            {
                Ok(content) => {
                    files_checked += 1;
                    live_lines += count_live_references(&content, &settings.database);
                }
                Err(e) => {
                    tracing::warn!(path = %file.original_path, error = %e, "residual check read failed");
                }
            }
        }
    }

    if live_lines == 0 {
        QaCheck::new(
            name,
            CheckStatus::Pass,
            format!("{files_checked} files re-checked, 0 live references"),
        )
    } else {
        QaCheck::new(
            name,
            CheckStatus::Fail,
            format!("{live_lines} live references remain"),
        )
    }
}

/// Lines mentioning the database that are neither comments nor header.
fn count_live_references(content: &str, database: &str) -> usize {
    let needle = database.to_ascii_lowercase();
    content
        .lines()
        .filter(|line| {
            let lower = line.to_ascii_lowercase();
            if !lower.contains(&needle) {
                return false;
            }
            let trimmed = line.trim_start();
            !(trimmed.starts_with('#')
                || trimmed.starts_with("//")
                || trimmed.starts_with("--")
                || trimmed.starts_with("<!--")
                || trimmed.starts_with("raise RuntimeError")
                || trimmed.starts_with("def connect_to_")
                || trimmed.starts_with("echo "))
        })
        .count()
}

/// Every matched file must carry at least one processing result, and none
/// may have failed.
fn rule_compliance_check(results: &[RepositoryResult]) -> QaCheck {
    let name = "rule_compliance";
    let mut missing = 0usize;
    let mut failed = 0usize;
    for result in results {
        missing += result.files_matched.saturating_sub(result.file_results.len());
        failed += result.file_results.iter().filter(|f| !f.success).count();
    }
    if missing == 0 && failed == 0 {
        QaCheck::new(name, CheckStatus::Pass, "every matched file was processed")
    } else if failed > 0 {
        QaCheck::new(
            name,
            CheckStatus::Fail,
            format!("{failed} files failed processing, {missing} unprocessed"),
        )
    } else {
        QaCheck::new(name, CheckStatus::Fail, format!("{missing} files unprocessed"))
    }
}

/// Advisory only: the host still resolves each repository's structure.
async fn service_integrity_check(
    registry: &ClientRegistry,
    results: &[RepositoryResult],
) -> QaCheck {
    let name = "service_integrity";
    let host = match registry.host().await {
        Ok(host) => host,
        Err(e) => return QaCheck::new(name, CheckStatus::Warning, e.to_string()),
    };

    let mut unresolved = Vec::new();
    for result in results {
        let Ok(repo) = RepoRef::parse_url(&result.repo_url) else {
            continue;
        };
        if host.analyze_repo_structure(&repo).await.is_err() {
            unresolved.push(repo.to_string());
        }
    }

    if unresolved.is_empty() {
        QaCheck::new(name, CheckStatus::Pass, "all repositories resolve")
    } else {
        QaCheck::new(
            name,
            CheckStatus::Warning,
            format!("unresolved: {}", unresolved.join(", ")),
        )
    }
}

// ---------------------------------------------------------------------------
// Step 4: workflow_summary
// ---------------------------------------------------------------------------

/// Aggregate the run into a final metrics payload.
pub fn workflow_summary(ctx: StepContext) -> StepFuture {
    Box::pin(async move {
        let results = collect_repo_results(&ctx);
        let chat_failures = ctx
            .context()
            .shared(CHAT_FAILURES_KEY)
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let qa_score = ctx
            .context()
            .step_result("quality_assurance")
            .and_then(|v| serde_json::from_value::<QaReport>(v).ok())
            .map(|r| r.score())
            .unwrap_or(0.0);

        let files_matched: usize = results.iter().map(|r| r.files_matched).sum();
        let files_modified: usize = results.iter().map(|r| r.files_modified).sum();
        let prs_opened = results.iter().filter(|r| r.pr_url.is_some()).count();
        let repo_errors: usize = results.iter().map(|r| r.errors.len()).sum();

        let metrics: std::collections::BTreeMap<String, f64> = [
            ("repositories".to_string(), results.len() as f64),
            ("files_matched".to_string(), files_matched as f64),
            ("files_modified".to_string(), files_modified as f64),
            ("prs_opened".to_string(), prs_opened as f64),
            ("repo_errors".to_string(), repo_errors as f64),
            ("warnings.chat_failures".to_string(), chat_failures as f64),
            ("qa_score".to_string(), qa_score),
        ]
        .into_iter()
        .collect();

        ctx.logger()
            .log_metrics("summary", "decommission summary", metrics.clone());

        serde_json::to_value(&metrics).map_err(|e| StepError::failed(e.to_string()))
    })
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
