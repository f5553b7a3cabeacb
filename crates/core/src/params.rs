// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchical parameter resolution.
//!
//! Resolution order, leftmost wins:
//! 1. process environment
//! 2. optional `.env`-style file
//! 3. optional JSON secrets file
//!
//! Values sourced from the secrets file are secret by definition; callers can
//! mark additional names secret when building the service.

use crate::error::ConfigError;
use crate::secret::Secret;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A resolved parameter value plus its redaction flag.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Plain(String),
    Secret(Secret),
}

impl ParameterValue {
    /// The plaintext value, regardless of sensitivity.
    pub fn expose(&self) -> &str {
        match self {
            ParameterValue::Plain(s) => s,
            ParameterValue::Secret(s) => s.expose(),
        }
    }

    /// Rendering safe for any log sink.
    pub fn display(&self) -> String {
        match self {
            ParameterValue::Plain(s) => s.clone(),
            ParameterValue::Secret(s) => s.redacted(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, ParameterValue::Secret(_))
    }
}

/// Layered parameter resolver.
pub struct ParameterService {
    env: BTreeMap<String, String>,
    dotenv: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
    secret_names: HashSet<String>,
}

impl ParameterService {
    /// Build from the process environment only.
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
            dotenv: BTreeMap::new(),
            secrets: BTreeMap::new(),
            secret_names: HashSet::new(),
        }
    }

    /// Build from an explicit environment map (for tests and embedding).
    pub fn from_map(env: BTreeMap<String, String>) -> Self {
        Self {
            env,
            dotenv: BTreeMap::new(),
            secrets: BTreeMap::new(),
            secret_names: HashSet::new(),
        }
    }

    /// Layer in a `.env`-style file. Lines are `KEY=VALUE`; `#` comments and
    /// blank lines are ignored. Missing file is not an error.
    pub fn with_dotenv_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(self);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.dotenv
                    .insert(key.trim().to_string(), unquote(value.trim()).to_string());
            }
        }
        Ok(self)
    }

    /// Layer in a JSON secrets file (`{"NAME": "value", …}`). Every name in
    /// the file is registered as secret. Missing file is not an error.
    pub fn with_secrets_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(self);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|e| ConfigError::MalformedServerConfig {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        for (key, value) in map {
            self.secret_names.insert(key.clone());
            self.secrets.insert(key, value);
        }
        Ok(self)
    }

    /// Register additional names whose values must be redacted when logged.
    pub fn mark_secret(mut self, names: &[&str]) -> Self {
        for name in names {
            self.secret_names.insert((*name).to_string());
        }
        self
    }

    /// Resolve a parameter, or `None` when no layer defines it.
    pub fn get(&self, name: &str) -> Option<ParameterValue> {
        let raw = self
            .env
            .get(name)
            .or_else(|| self.dotenv.get(name))
            .or_else(|| self.secrets.get(name))?;
        Some(if self.is_secret(name) {
            ParameterValue::Secret(Secret::new(raw.clone()))
        } else {
            ParameterValue::Plain(raw.clone())
        })
    }

    /// Resolve a parameter or fail with [`ConfigError::MissingParameter`].
    pub fn require(&self, name: &str) -> Result<ParameterValue, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.secret_names.contains(name)
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Immutable snapshot of the runtime environment, built once at workflow
/// start and consumed read-only by every component.
#[derive(Debug, Clone)]
pub struct ParameterConfig {
    required: BTreeMap<String, ParameterValue>,
    optional: BTreeMap<String, ParameterValue>,
}

impl ParameterConfig {
    /// Resolve the given required and optional names against the service.
    ///
    /// Optional entries carry a default used when no layer defines them.
    pub fn resolve(
        service: &ParameterService,
        required: &[&str],
        optional: &[(&str, &str)],
    ) -> Result<Self, ConfigError> {
        let mut req = BTreeMap::new();
        for name in required {
            req.insert((*name).to_string(), service.require(name)?);
        }
        let mut opt = BTreeMap::new();
        for (name, default) in optional {
            let value = service
                .get(name)
                .unwrap_or_else(|| ParameterValue::Plain((*default).to_string()));
            opt.insert((*name).to_string(), value);
        }
        Ok(Self {
            required: req,
            optional: opt,
        })
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.required.get(name).or_else(|| self.optional.get(name))
    }

    pub fn parameter_count(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    pub fn secret_count(&self) -> usize {
        self.required
            .values()
            .chain(self.optional.values())
            .filter(|v| v.is_secret())
            .count()
    }

    /// All parameters in stable order with log-safe renderings.
    pub fn display_entries(&self) -> Vec<(String, String)> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(|(k, v)| (k.clone(), v.display()))
            .collect()
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
