// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human console sink: ANSI colors, tree glyphs, block progress bars.
//!
//! No animated redraws; every update emits a fresh line so output stays
//! usable under redirection and in CI logs.

use crate::entry::{LogEntry, LogLevel};
use crate::payload::{Payload, ProgressStatus, ProgressUpdate, TableData, TreeNode};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::io::Write;

const RESET: &str = "\x1b[0m";
const BAR_WIDTH: usize = 16;

fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "\x1b[2m",
        LogLevel::Info => "\x1b[32m",
        LogLevel::Warning => "\x1b[33m",
        LogLevel::Error => "\x1b[31m",
        LogLevel::Critical => "\x1b[1;31m",
    }
}

/// Console sink writing colored, human-oriented lines.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(std::io::stdout())),
            color: true,
        }
    }

    /// Write to an explicit sink (tests, captured output).
    pub fn with_writer(writer: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            color,
        }
    }

    /// Render one entry, including any structured payload beneath it.
    pub fn write(&self, entry: &LogEntry) {
        let mut lines = vec![self.headline(entry)];
        if let Some(data) = &entry.data {
            if let Ok(payload) = serde_json::from_value::<Payload>(data.clone()) {
                self.render_payload(&payload, &mut lines);
            }
        }

        let mut writer = self.writer.lock();
        for line in lines {
            if writeln!(writer, "{}", line).is_err() {
                return;
            }
        }
        let _ = writer.flush();
    }

    fn headline(&self, entry: &LogEntry) -> String {
        let time = Utc
            .timestamp_millis_opt(entry.timestamp_ms as i64)
            .single()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "??:??:??".to_string());
        let level = format!("{:<8}", entry.level.to_string());
        let level = if self.color {
            format!("{}{}{}", level_color(entry.level), level, RESET)
        } else {
            level
        };
        format!("{} {} [{}] {}", time, level, entry.component, entry.message)
    }

    fn render_payload(&self, payload: &Payload, lines: &mut Vec<String>) {
        match payload {
            Payload::Table { title, table } => {
                lines.push(format!("  {title}"));
                render_table(table, lines);
            }
            Payload::Tree { title, roots } => {
                lines.push(format!("  {title}"));
                for root in roots {
                    render_tree(root, "  ", lines);
                }
            }
            Payload::Metrics { title, values } => {
                lines.push(format!("  {title}"));
                for (key, value) in values {
                    lines.push(format!("    {key}: {value}"));
                }
            }
            Payload::Progress(update) => {
                lines.push(format!("  {}", render_progress(update)));
            }
            Payload::KeyValue { title, values } => {
                lines.push(format!("  {title}"));
                for (key, value) in values {
                    lines.push(format!("    {key}: {value}"));
                }
            }
        }
    }
}

fn render_table(table: &TableData, lines: &mut Vec<String>) {
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            table
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(String::len)
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect();
        format!("    {}", padded.join("  "))
    };

    lines.push(format_row(&table.headers));
    lines.push(format!(
        "    {}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    ));
    for row in &table.rows {
        lines.push(format_row(row));
    }
}

fn render_tree(node: &TreeNode, indent: &str, lines: &mut Vec<String>) {
    lines.push(format!("{indent}{}", node.label));
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let glyph = if last { "└─" } else { "├─" };
        lines.push(format!("{indent}{glyph} {}", child.label));
        let child_indent = if last {
            format!("{indent}   ")
        } else {
            format!("{indent}│  ")
        };
        for grandchild in &child.children {
            render_tree_nested(grandchild, &child_indent, lines);
        }
    }
}

fn render_tree_nested(node: &TreeNode, indent: &str, lines: &mut Vec<String>) {
    lines.push(format!("{indent}├─ {}", node.label));
    let deeper = format!("{indent}│  ");
    for child in &node.children {
        render_tree_nested(child, &deeper, lines);
    }
}

fn render_progress(update: &ProgressUpdate) -> String {
    let mut parts = Vec::new();

    if let Some(percent) = update.percent {
        let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
        parts.push(format!("{bar} {percent:.0}%"));
    } else {
        parts.push(update.status.to_string());
    }

    if let (Some(current), Some(total)) = (update.current, update.total) {
        parts.push(format!("({current}/{total})"));
    }
    if let Some(rate) = update.rate {
        parts.push(format!("{rate:.1}/s"));
    }
    if let Some(eta) = update.eta_seconds {
        parts.push(format!("eta {eta:.0}s"));
    }
    if update.status == ProgressStatus::Failed {
        parts.push("FAILED".to_string());
    }

    format!("{} {}", update.step_name, parts.join(" "))
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
