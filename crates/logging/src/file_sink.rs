// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rotating JSON-line file sink.

use crate::entry::LogEntry;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// Append-only JSON-line sink with size-based rotation.
///
/// One JSON object per line. The single appender is guarded by a mutex;
/// rotation renames `log` → `log.1` → … → `log.N` and drops the oldest.
/// Write failures are reported via tracing and never propagate — logging
/// must not break the engine.
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    appender: Mutex<()>,
}

impl RotatingFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            appender: Mutex::new(()),
        }
    }

    pub fn with_rotation(mut self, max_bytes: u64, backup_count: usize) -> Self {
        self.max_bytes = max_bytes;
        self.backup_count = backup_count;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a JSON line.
    pub fn write(&self, entry: &LogEntry) {
        let _guard = self.appender.lock();
        if let Err(e) = self.write_inner(entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write log entry");
        }
    }

    fn write_inner(&self, entry: &LogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let current_len = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if current_len > 0 && current_len + line.len() as u64 + 1 > self.max_bytes {
            self.rotate()?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn rotate(&self) -> std::io::Result<()> {
        if self.backup_count == 0 {
            fs::remove_file(&self.path)?;
            return Ok(());
        }
        let backup = |n: usize| -> PathBuf {
            let mut p = self.path.clone().into_os_string();
            p.push(format!(".{n}"));
            PathBuf::from(p)
        };
        let oldest = backup(self.backup_count);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.backup_count).rev() {
            let from = backup(n);
            if from.exists() {
                fs::rename(&from, backup(n + 1))?;
            }
        }
        fs::rename(&self.path, backup(1))?;
        Ok(())
    }
}

/// Read every entry back from a JSON-line log file.
///
/// Unparseable lines are skipped; the reader is the audit counterpart of the
/// sink and backs the serializer round-trip invariant.
pub fn read_entries(path: &Path) -> std::io::Result<Vec<LogEntry>> {
    let file = File::open(path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!(error = %e, "skipping unparseable log line"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "file_sink_tests.rs"]
mod tests;
