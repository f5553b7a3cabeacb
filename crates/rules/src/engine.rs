// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contextual rule application and write-back.
//!
//! Rules are pure (content in, content out); side effects happen only in
//! the final write step through the host client.

use crate::error::RuleError;
use crate::header::{has_header, header_block, DecommissionOptions};
use crate::packs::rule_pack;
use regex::Regex;
use sha2::{Digest, Sha256};
use sunset_clients::{CommitRef, HostClient, RepoRef};
use sunset_core::{FileProcessingResult, MatchedFile, Rule, RuleAction, SourceType};

/// A file after rule application, ready to commit.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub original_path: String,
    pub source_type: SourceType,
    pub new_content: String,
    pub changed: bool,
    pub result: FileProcessingResult,
}

/// Dedicated branch for one (database, repository) pair.
///
/// The short sha pins the branch to the repository so re-runs reuse it.
pub fn branch_name(database: &str, repo_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repo_url.as_bytes());
    hasher.update(b"\0");
    hasher.update(database.as_bytes());
    let digest = hasher.finalize();
    let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("decommission-{database}-{short}")
}

/// Applies the per-type rule pack to matched files and commits the results.
pub struct ContextualRulesEngine {
    options: DecommissionOptions,
}

impl ContextualRulesEngine {
    pub fn new(options: DecommissionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecommissionOptions {
        &self.options
    }

    /// Apply the rule pack for the file's source type.
    ///
    /// Re-applying to an already-decommissioned file is a no-op: the header
    /// is the idempotence marker.
    pub fn apply_to_file(
        &self,
        file: &MatchedFile,
        content: &str,
    ) -> Result<ProcessedFile, RuleError> {
        let source_type = file.source_type.unwrap_or(SourceType::Unknown);

        if has_header(content) {
            return Ok(ProcessedFile {
                original_path: file.original_path.clone(),
                source_type,
                new_content: content.to_string(),
                changed: false,
                result: FileProcessingResult::succeeded(file.original_path.clone(), vec![], 0),
            });
        }

        let pack = rule_pack(&self.options.database, source_type);
        let mut current = content.to_string();
        let mut applied = Vec::new();
        let mut lines_changed = 0usize;

        for rule in &pack {
            let (next, changed) = self.apply_rule(rule, &current, source_type)?;
            if changed > 0 {
                applied.push(rule.id.clone());
                lines_changed += changed;
                current = next;
            }
        }

        let changed = lines_changed > 0;
        Ok(ProcessedFile {
            original_path: file.original_path.clone(),
            source_type,
            new_content: current,
            changed,
            result: FileProcessingResult::succeeded(
                file.original_path.clone(),
                applied,
                lines_changed,
            ),
        })
    }

    fn apply_rule(
        &self,
        rule: &Rule,
        content: &str,
        source_type: SourceType,
    ) -> Result<(String, usize), RuleError> {
        let pattern = Regex::new(&rule.pattern).map_err(|e| RuleError::BadPattern {
            rule_id: rule.id.clone(),
            reason: e.to_string(),
        })?;

        let outcome = match rule.action {
            RuleAction::CommentOut => comment_out(
                content,
                &pattern,
                source_type,
                source_type == SourceType::Infrastructure,
            ),
            RuleAction::DeleteLine => delete_lines(content, &pattern),
            RuleAction::InsertDeprecationNotice => {
                insert_notice(content, &pattern, source_type, &self.options)
            }
            RuleAction::ReplaceWithException => replace_with_exception(
                content,
                &pattern,
                &self.options,
            ),
            RuleAction::PrependHeader => {
                let header = header_block(&self.options, source_type);
                let count = header.lines().count();
                (format!("{header}{content}"), count)
            }
        };
        Ok(outcome)
    }

    /// Commit message per the decommissioning convention.
    pub fn commit_message(&self, source_type: SourceType, path: &str) -> String {
        format!(
            "decommission({}): remove {} references from {}",
            source_type, self.options.database, path
        )
    }

    /// Commit one processed file to the decommissioning branch.
    pub async fn commit_file(
        &self,
        host: &HostClient,
        repo: &RepoRef,
        branch: &str,
        processed: &ProcessedFile,
    ) -> Result<CommitRef, RuleError> {
        let message = self.commit_message(processed.source_type, &processed.original_path);
        let commit = host
            .create_or_update_file(
                repo,
                &processed.original_path,
                &processed.new_content,
                &message,
                branch,
            )
            .await?;
        Ok(commit)
    }
}

/// Prefix matched lines with the comment token, preserving indentation.
///
/// When `block_aware` is set, a matched line that opens a braced block
/// (terraform) or an indented mapping (yaml) takes its whole block along.
fn comment_out(
    content: &str,
    pattern: &Regex,
    source_type: SourceType,
    block_aware: bool,
) -> (String, usize) {
    let token = source_type.comment_token();
    let lines: Vec<&str> = content.lines().collect();
    let mut commented = vec![false; lines.len()];

    for (index, line) in lines.iter().enumerate() {
        if !pattern.is_match(line) || is_commented(line, token.prefix) {
            continue;
        }
        commented[index] = true;
        if !block_aware {
            continue;
        }
        let trimmed = line.trim_end();
        if trimmed.ends_with('{') {
            mark_braced_block(&lines, index, &mut commented);
        } else if trimmed.ends_with(':') {
            mark_indented_block(&lines, index, &mut commented);
        }
    }

    let mut out = String::with_capacity(content.len());
    let mut changed = 0usize;
    for (index, line) in lines.iter().enumerate() {
        if commented[index] {
            out.push_str(&comment_line(line, token.prefix, token.suffix));
            changed += 1;
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    if !content.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    (out, changed)
}

fn mark_braced_block(lines: &[&str], start: usize, commented: &mut [bool]) {
    let mut depth = 0i32;
    for (index, line) in lines.iter().enumerate().skip(start) {
        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;
        commented[index] = true;
        if depth <= 0 {
            break;
        }
    }
}

fn mark_indented_block(lines: &[&str], start: usize, commented: &mut [bool]) {
    let base = indent_width(lines[start]);
    let mut last_content = start;
    for (index, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_width(line) <= base {
            break;
        }
        last_content = index;
    }
    for slot in commented.iter_mut().take(last_content + 1).skip(start + 1) {
        *slot = true;
    }
    // Blank separator lines inside the block stay blank.
    for index in start + 1..=last_content {
        if lines[index].trim().is_empty() {
            commented[index] = false;
        }
    }
}

fn delete_lines(content: &str, pattern: &Regex) -> (String, usize) {
    let mut removed = 0usize;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            if pattern.is_match(line) {
                removed += 1;
                false
            } else {
                true
            }
        })
        .collect();
    let mut out = kept.join("\n");
    if content.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    (out, removed)
}

fn insert_notice(
    content: &str,
    pattern: &Regex,
    source_type: SourceType,
    options: &DecommissionOptions,
) -> (String, usize) {
    let token = source_type.comment_token();
    let notice_body = format!(
        "DEPRECATED: {} was decommissioned on {}; see {}",
        options.database,
        options.date.format("%Y-%m-%d"),
        options.ticket,
    );
    let mut out = String::with_capacity(content.len());
    let mut inserted = 0usize;
    let mut previous: Option<&str> = None;

    for line in content.lines() {
        if pattern.is_match(line) {
            let already = previous
                .map(|p| p.contains("DEPRECATED:"))
                .unwrap_or(false);
            if !already {
                let indent = &line[..indent_width(line)];
                out.push_str(indent);
                out.push_str(&token.wrap(&notice_body));
                out.push('\n');
                inserted += 1;
            }
        }
        out.push_str(line);
        out.push('\n');
        previous = Some(line);
    }
    if !content.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    (out, inserted)
}

/// Python: replace the enclosing function body with a raise, keeping the
/// original body as comments. A module-level match instead gains a guard
/// function that raises on call.
fn replace_with_exception(
    content: &str,
    pattern: &Regex,
    options: &DecommissionOptions,
) -> (String, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let Some(match_index) = lines.iter().position(|l| pattern.is_match(l)) else {
        return (content.to_string(), 0);
    };

    let raise_message = format!(
        "{} was decommissioned on {}; contact {}",
        options.database,
        options.date.format("%Y-%m-%d"),
        options.contact,
    );

    if let Some(def_index) = enclosing_def(&lines, match_index) {
        let def_indent = indent_width(lines[def_index]);
        let body_indent = " ".repeat(def_indent + 4);
        let mut out_lines: Vec<String> = Vec::with_capacity(lines.len() + 2);
        out_lines.extend(lines[..=def_index].iter().map(|l| l.to_string()));
        out_lines.push(format!("{body_indent}raise RuntimeError(\"{raise_message}\")"));

        let mut changed = 1usize;
        let mut index = def_index + 1;
        while index < lines.len() {
            let line = lines[index];
            if !line.trim().is_empty() && indent_width(line) <= def_indent {
                break;
            }
            if line.trim().is_empty() {
                out_lines.push(line.to_string());
            } else {
                out_lines.push(comment_line(line, "#", ""));
                changed += 1;
            }
            index += 1;
        }
        out_lines.extend(lines[index..].iter().map(|l| l.to_string()));

        let mut out = out_lines.join("\n");
        if content.ends_with('\n') {
            out.push('\n');
        }
        (out, changed)
    } else {
        // Module scope: prepend a raising guard and comment the matches.
        let guard_name = format!("connect_to_{}", options.database);
        let guard = format!(
            "def {guard_name}():\n    raise RuntimeError(\"{raise_message}\")\n\n\n"
        );
        let (commented, changed) =
            comment_out(content, pattern, SourceType::Python, false);
        (format!("{guard}{commented}"), changed + 2)
    }
}

/// Nearest `def` above the match at strictly smaller indentation.
fn enclosing_def(lines: &[&str], match_index: usize) -> Option<usize> {
    let match_indent = indent_width(lines[match_index]);
    if match_indent == 0 {
        return None;
    }
    lines[..match_index]
        .iter()
        .rposition(|line| {
            let indent = indent_width(line);
            line.trim_start().starts_with("def ") && indent < match_indent
        })
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_commented(line: &str, prefix: &str) -> bool {
    line.trim_start().starts_with(prefix)
}

fn comment_line(line: &str, prefix: &str, suffix: &str) -> String {
    let indent = &line[..indent_width(line)];
    let body = line.trim_start();
    if suffix.is_empty() {
        format!("{indent}{prefix} {body}")
    } else {
        format!("{indent}{prefix} {body} {suffix}")
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
