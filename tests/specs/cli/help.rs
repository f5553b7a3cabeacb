// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver-binary surface checks.

use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("sunset").unwrap().arg("--help").assert();
    let output = output.success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("run"));
    assert!(stdout.contains("validate"));
}

#[test]
fn run_requires_database_and_repo() {
    Command::cargo_bin("sunset")
        .unwrap()
        .arg("run")
        .assert()
        .failure();
}

#[test]
fn version_prints() {
    Command::cargo_bin("sunset")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}
