// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packed-repository archive parsing.
//!
//! The packer emits one UTF-8 text file with XML-ish framing:
//!
//! ```text
//! <repository url="..." packed_at="...">
//!   <file path="relative/path"><![CDATA[ …file bytes… ]]></file>
//! </repository>
//! ```
//!
//! Binary files are omitted or wrapped with `encoding="base64"`; unreadable
//! bodies are skipped without aborting the parse.

use crate::error::ExtractError;
use std::path::Path;

/// One file entry, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: String,
    pub content: String,
}

/// Parsed packed archive.
#[derive(Debug, Clone, Default)]
pub struct PackedArchive {
    pub url: Option<String>,
    pub files: Vec<ArchiveFile>,
}

impl PackedArchive {
    /// Read and parse an archive file from disk.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse archive text.
    pub fn parse(input: &str) -> Result<Self, ExtractError> {
        let mut archive = PackedArchive {
            url: attr_value(input, "<repository", "url"),
            files: Vec::new(),
        };

        let mut rest = input;
        while let Some(start) = rest.find("<file ") {
            let tag_rest = &rest[start..];
            let tag_end = match tag_rest.find('>') {
                Some(end) => end,
                None => return Err(ExtractError::Malformed("unterminated <file> tag".into())),
            };
            let tag = &tag_rest[..tag_end + 1];
            let body_rest = &tag_rest[tag_end + 1..];

            let close = match body_rest.find("</file>") {
                Some(close) => close,
                None => {
                    return Err(ExtractError::Malformed(format!(
                        "missing </file> for {tag:?}"
                    )))
                }
            };
            let raw_body = &body_rest[..close];
            rest = &body_rest[close + "</file>".len()..];

            let path = match attr_value(tag, "<file", "path") {
                Some(path) if !path.is_empty() => path,
                _ => {
                    tracing::warn!(tag, "skipping file entry without path");
                    continue;
                }
            };

            // base64-wrapped binaries are not text; skip them.
            if attr_value(tag, "<file", "encoding").as_deref() == Some("base64") {
                tracing::debug!(%path, "skipping base64 entry");
                continue;
            }

            archive.files.push(ArchiveFile {
                path,
                content: unwrap_cdata(raw_body).to_string(),
            });
        }

        Ok(archive)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ArchiveFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Extract `name="value"` from the first occurrence of `tag … >`.
fn attr_value(input: &str, tag: &str, name: &str) -> Option<String> {
    let start = input.find(tag)?;
    let tag_text = &input[start..input[start..].find('>')? + start + 1];
    let marker = format!("{name}=\"");
    let attr_start = tag_text.find(&marker)? + marker.len();
    let attr_rest = &tag_text[attr_start..];
    let attr_end = attr_rest.find('"')?;
    Some(attr_rest[..attr_end].to_string())
}

/// Strip one CDATA wrapper when present; otherwise return the body trimmed
/// of the newlines the packer inserts around it.
fn unwrap_cdata(body: &str) -> &str {
    let trimmed = body.strip_prefix('\n').unwrap_or(body);
    if let Some(inner) = trimmed.strip_prefix("<![CDATA[") {
        inner.strip_suffix("]]>").unwrap_or(inner)
    } else {
        trimmed
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
