// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static pattern catalog, parameterised by the database name.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sunset_core::SourceType;

/// Pattern-strength weights, exposed as configuration with locked defaults.
///
/// Exact identifier hits outrank configuration keys, connection-string
/// fragments and SQL verbs; matches on comment lines are downweighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryWeights {
    pub exact: f64,
    pub config_key: f64,
    pub connection_string: f64,
    pub sql_verb: f64,
    pub comment_multiplier: f64,
}

impl Default for DiscoveryWeights {
    fn default() -> Self {
        Self {
            exact: 1.0,
            config_key: 0.9,
            connection_string: 0.85,
            sql_verb: 0.8,
            comment_multiplier: 0.6,
        }
    }
}

/// One compiled pattern with its strength.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub id: &'static str,
    pub regex: Regex,
    pub strength: f64,
}

fn spec(id: &'static str, pattern: String, strength: f64) -> Option<PatternSpec> {
    match Regex::new(&pattern) {
        Ok(regex) => Some(PatternSpec {
            id,
            regex,
            strength,
        }),
        Err(e) => {
            tracing::warn!(id, error = %e, "pattern failed to compile");
            None
        }
    }
}

/// Patterns applicable to one source type.
///
/// Every type gets the exact identifier; configuration-like types add key
/// and connection-string forms; SQL adds verb-prefixed forms.
pub fn patterns_for(database: &str, source_type: SourceType) -> Vec<PatternSpec> {
    let d = regex::escape(database);
    let weights = DiscoveryWeights::default();
    let mut specs = Vec::new();

    specs.extend(spec(
        "exact-identifier",
        format!(r"(?i)\b{d}\b"),
        weights.exact,
    ));

    match source_type {
        SourceType::Configuration | SourceType::Infrastructure => {
            specs.extend(spec(
                "config-key",
                format!(r"(?i)\b{d}_(?:HOST|PORT|URL|USER|PASSWORD|NAME|DSN)\b"),
                weights.config_key,
            ));
            specs.extend(spec(
                "connection-string",
                format!(r"(?i)\b(?:postgres(?:ql)?|mysql)://\S*{d}"),
                weights.connection_string,
            ));
        }
        SourceType::Python | SourceType::Shell | SourceType::Mixed => {
            specs.extend(spec(
                "config-key",
                format!(r"(?i)\b{d}_(?:HOST|PORT|URL|USER|PASSWORD|NAME|DSN)\b"),
                weights.config_key,
            ));
            specs.extend(spec(
                "connection-string",
                format!(r"(?i)\b(?:postgres(?:ql)?|mysql)://\S*{d}"),
                weights.connection_string,
            ));
            specs.extend(spec(
                "sql-verb",
                format!(r"(?i)\b(?:FROM|JOIN|INTO|UPDATE|TABLE|DATABASE|USE)\s+{d}\b"),
                weights.sql_verb,
            ));
        }
        SourceType::Sql => {
            specs.extend(spec(
                "sql-verb",
                format!(r"(?i)\b(?:FROM|JOIN|INTO|UPDATE|TABLE|DATABASE|USE)\s+{d}\b"),
                weights.sql_verb,
            ));
        }
        SourceType::Documentation | SourceType::Unknown => {}
    }

    specs
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
