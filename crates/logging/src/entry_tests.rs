// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn levels_are_ordered() {
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Warning < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Critical);
}

#[test]
fn level_serde_is_uppercase() {
    assert_eq!(
        serde_json::to_string(&LogLevel::Warning).unwrap(),
        "\"WARNING\""
    );
    let parsed: LogLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
    assert_eq!(parsed, LogLevel::Critical);
}

#[test]
fn entry_omits_empty_optionals() {
    let entry = LogEntry::new(1000, "run-1", LogLevel::Info, "engine", "started");
    let json = serde_json::to_string(&entry).unwrap();
    assert!(!json.contains("step_index"));
    assert!(!json.contains("duration_ms"));
    assert!(!json.contains("data"));
}

#[test]
fn entry_round_trips_with_data() {
    let entry = LogEntry::new(1000, "run-1", LogLevel::Error, "rules", "rule failed")
        .step_index(3usize)
        .duration_ms(250u64)
        .data(serde_json::json!({"rule_id": "py-raise"}));

    let json = serde_json::to_string(&entry).unwrap();
    let back: LogEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}

fn arb_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
    ]
}

proptest! {
    #[test]
    fn entry_serde_round_trip(
        ts in any::<u64>(),
        level in arb_level(),
        component in "[a-z_]{1,16}",
        message in ".{0,64}",
        step in proptest::option::of(0usize..100),
    ) {
        let mut entry = LogEntry::new(ts, "run-prop", level, component, message);
        entry.step_index = step;
        let json = serde_json::to_string(&entry).unwrap();
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, entry);
    }
}
