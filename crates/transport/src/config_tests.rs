// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const CONFIG: &str = r#"{
  "mcpServers": {
    "ovr_github": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-github"],
      "env": {"GITHUB_TOKEN": "${GITHUB_TOKEN}"}
    },
    "ovr_filesystem": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-filesystem", "."]
    }
  }
}"#;

fn lookup(name: &str) -> Option<String> {
    match name {
        "GITHUB_TOKEN" => Some("ghp_test".to_string()),
        _ => None,
    }
}

#[test]
fn parses_servers_with_substitution() {
    let config = ServersConfig::parse(CONFIG, "test.json".into(), lookup).unwrap();
    assert_eq!(config.len(), 2);

    let github = config.get("ovr_github").unwrap();
    assert_eq!(github.command, "npx");
    assert_eq!(github.env.get("GITHUB_TOKEN").unwrap(), "ghp_test");

    let fs = config.get("ovr_filesystem").unwrap();
    assert_eq!(fs.args.last().unwrap(), ".");
}

#[test]
fn unknown_variable_substitutes_empty() {
    let content = r#"{"mcpServers": {"ovr_x": {"command": "run", "args": ["${NOPE}/bin"]}}}"#;
    let config = ServersConfig::parse(content, "test.json".into(), lookup).unwrap();
    assert_eq!(config.get("ovr_x").unwrap().args[0], "/bin");
}

#[test]
fn rejects_missing_prefix() {
    let content = r#"{"mcpServers": {"github": {"command": "npx"}}}"#;
    let err = ServersConfig::parse(content, "test.json".into(), lookup).unwrap_err();
    assert!(matches!(err, sunset_core::ConfigError::BadServerName(name) if name == "github"));
}

#[test]
fn rejects_malformed_json() {
    let err = ServersConfig::parse("{", "broken.json".into(), lookup).unwrap_err();
    assert!(matches!(
        err,
        sunset_core::ConfigError::MalformedServerConfig { .. }
    ));
}

#[test]
fn unknown_server_lookup_fails() {
    let config = ServersConfig::parse(CONFIG, "test.json".into(), lookup).unwrap();
    let err = config.get("ovr_slack").unwrap_err();
    assert!(matches!(err, sunset_core::ConfigError::UnknownServer(_)));
}

#[yare::parameterized(
    plain        = { "no vars",          "no vars" },
    single       = { "${GITHUB_TOKEN}",  "ghp_test" },
    embedded     = { "a ${GITHUB_TOKEN} b", "a ghp_test b" },
    unterminated = { "a ${OPEN",         "a ${OPEN" },
)]
fn substitution_cases(input: &str, expected: &str) {
    assert_eq!(substitute(input, &lookup), expected);
}
