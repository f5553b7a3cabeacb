// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_matched_file_is_bare() {
    let file = MatchedFile::new("infra/main.tf");
    assert_eq!(file.original_path, "infra/main.tf");
    assert!(file.matches.is_empty());
    assert!(file.source_type.is_none());
}

#[test]
fn best_confidence_prefers_match_confidence() {
    let file = MatchedFile::builder()
        .confidence(0.5)
        .matches(vec![
            PatternMatch {
                line_number: 1,
                matched_text: "postgres_air".into(),
                context_lines: vec![],
                confidence: 0.9,
            },
            PatternMatch {
                line_number: 7,
                matched_text: "postgres_air_url".into(),
                context_lines: vec![],
                confidence: 0.7,
            },
        ])
        .build();

    assert!((file.best_confidence() - 0.9).abs() < f64::EPSILON);
}

#[test]
fn best_confidence_falls_back_to_classifier() {
    let file = MatchedFile::builder().confidence(0.8).build();
    assert!((file.best_confidence() - 0.8).abs() < f64::EPSILON);
}

#[test]
fn serde_omits_empty_optionals() {
    let file = MatchedFile::new("a.py");
    let json = serde_json::to_string(&file).unwrap();
    assert!(!json.contains("extracted_copy_path"));
    assert!(!json.contains("framework_hints"));

    let back: MatchedFile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, file);
}
