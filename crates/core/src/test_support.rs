// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers and proptest strategies.

pub mod strategies {
    use crate::source_type::SourceType;
    use proptest::prelude::*;

    pub fn arb_source_type() -> impl Strategy<Value = SourceType> {
        prop_oneof![
            Just(SourceType::Infrastructure),
            Just(SourceType::Configuration),
            Just(SourceType::Sql),
            Just(SourceType::Python),
            Just(SourceType::Shell),
            Just(SourceType::Documentation),
            Just(SourceType::Mixed),
            Just(SourceType::Unknown),
        ]
    }

    /// Identifiers that look like database names.
    pub fn arb_database_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{2,20}"
    }
}
