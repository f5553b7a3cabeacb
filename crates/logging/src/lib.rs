// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured dual-sink logging: JSON-line audit file plus human console.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod console;
mod entry;
mod file_sink;
mod logger;
mod payload;
mod progress;

pub use console::ConsoleSink;
pub use entry::{LogEntry, LogLevel};
pub use file_sink::{read_entries, RotatingFileSink, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
pub use logger::StructuredLogger;
pub use payload::{Payload, ProgressStatus, ProgressUpdate, TableData, TreeNode};
pub use progress::ProgressTracker;
