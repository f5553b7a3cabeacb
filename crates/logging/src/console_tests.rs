// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn capture() -> (ConsoleSink, SharedBuf) {
    let buf = SharedBuf::default();
    let sink = ConsoleSink::with_writer(Box::new(buf.clone()), false);
    (sink, buf)
}

fn capture_color() -> (ConsoleSink, SharedBuf) {
    let buf = SharedBuf::default();
    let sink = ConsoleSink::with_writer(Box::new(buf.clone()), true);
    (sink, buf)
}

fn entry(level: LogLevel, message: &str) -> LogEntry {
    LogEntry::new(1_722_470_400_000, "run-1", level, "engine", message)
}

#[test]
fn headline_contains_level_component_message() {
    let (sink, buf) = capture();
    sink.write(&entry(LogLevel::Info, "step started"));

    let out = buf.contents();
    assert!(out.contains("INFO"));
    assert!(out.contains("[engine]"));
    assert!(out.contains("step started"));
}

#[test]
fn color_mode_emits_ansi() {
    let (sink, buf) = capture_color();
    sink.write(&entry(LogLevel::Error, "boom"));
    assert!(buf.contents().contains("\x1b[31m"));
}

#[test]
fn plain_mode_has_no_ansi() {
    let (sink, buf) = capture();
    sink.write(&entry(LogLevel::Error, "boom"));
    assert!(!buf.contents().contains('\x1b'));
}

#[test]
fn table_payload_renders_rows() {
    let (sink, buf) = capture();
    let e = entry(LogLevel::Info, "qa summary").data(
        serde_json::to_value(Payload::Table {
            title: "checks".into(),
            table: TableData {
                headers: vec!["check".into(), "status".into()],
                rows: vec![
                    vec!["residual".into(), "pass".into()],
                    vec!["integrity".into(), "warning".into()],
                ],
                metadata: Default::default(),
            },
        })
        .unwrap(),
    );
    sink.write(&e);

    let out = buf.contents();
    assert!(out.contains("check"));
    assert!(out.contains("residual"));
    assert!(out.contains("warning"));
}

#[test]
fn tree_payload_uses_glyphs() {
    let (sink, buf) = capture();
    let e = entry(LogLevel::Info, "matched files").data(
        serde_json::to_value(Payload::Tree {
            title: "repos".into(),
            roots: vec![TreeNode::branch(
                "acme/payments",
                vec![TreeNode::leaf("app/db.py"), TreeNode::leaf("infra/main.tf")],
            )],
        })
        .unwrap(),
    );
    sink.write(&e);

    let out = buf.contents();
    assert!(out.contains("├─ app/db.py"));
    assert!(out.contains("└─ infra/main.tf"));
}

#[test]
fn progress_renders_block_bar() {
    let (sink, buf) = capture();
    let e = entry(LogLevel::Info, "progress").data(
        serde_json::to_value(Payload::Progress(ProgressUpdate {
            step_name: "process_repositories".into(),
            status: ProgressStatus::Progress,
            percent: Some(50.0),
            eta_seconds: Some(10.0),
            current: Some(2),
            total: Some(4),
            rate: Some(0.2),
        }))
        .unwrap(),
    );
    sink.write(&e);

    let out = buf.contents();
    assert!(out.contains('█'));
    assert!(out.contains('░'));
    assert!(out.contains("50%"));
    assert!(out.contains("(2/4)"));
    assert!(out.contains("eta 10s"));
}

#[yare::parameterized(
    zero    = { 0.0,   0 },
    half    = { 50.0,  8 },
    full    = { 100.0, 16 },
)]
fn bar_fill_is_proportional(percent: f64, expected_filled: usize) {
    let rendered = render_progress(&ProgressUpdate {
        step_name: "s".into(),
        status: ProgressStatus::Progress,
        percent: Some(percent),
        eta_seconds: None,
        current: None,
        total: None,
        rate: None,
    });
    assert_eq!(rendered.matches('█').count(), expected_filled);
}
