// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline settings, serializable so steps can carry them as parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_quarantine_root() -> PathBuf {
    PathBuf::from("tests/tmp/pattern_match")
}

/// Everything one decommissioning run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// The database being decommissioned, case-preserving.
    pub database: String,
    pub repo_urls: Vec<String>,
    #[serde(default)]
    pub chat_channel: Option<String>,
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    #[serde(default = "default_quarantine_root")]
    pub quarantine_root: PathBuf,
    /// Use the rule-less fallback processor instead of the rules engine.
    #[serde(default)]
    pub use_fallback: bool,
    /// Decommission date for headers; defaults to today at run time.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub ticket: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl PipelineSettings {
    pub fn new(database: impl Into<String>, repo_urls: Vec<String>) -> Self {
        Self {
            database: database.into(),
            repo_urls,
            chat_channel: None,
            base_branch: default_base_branch(),
            quarantine_root: default_quarantine_root(),
            use_fallback: false,
            date: None,
            ticket: None,
            contact: None,
        }
    }

    sunset_core::setters! {
        into {
            base_branch: String,
            quarantine_root: PathBuf,
        }
        set {
            use_fallback: bool,
        }
        option {
            chat_channel: String,
            date: NaiveDate,
            ticket: String,
            contact: String,
        }
    }

    /// Header options for this run.
    pub fn decommission_options(&self) -> sunset_rules::DecommissionOptions {
        let date = self
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let mut options = sunset_rules::DecommissionOptions::new(&self.database, date);
        if let Some(ticket) = &self.ticket {
            options = options.ticket(ticket.clone());
        }
        if let Some(contact) = &self.contact {
            options = options.contact(contact.clone());
        }
        if self.use_fallback {
            options = options.strategy("fallback");
        }
        options
    }
}
