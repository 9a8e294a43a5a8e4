// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Service metadata descriptors (`metadata.yml`).
//!
//! Every registrable service keeps a descriptor next to its source code:
//!
//! ```yaml
//! ---
//! name: genes
//! version: 0.1
//! type: query
//! main_module: main.py
//! ```
//!
//! The descriptor is discovered by searching upward from the module
//! directory, stopping at the repository root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{ArchiveError, Result};

/// File name of the service descriptor.
pub const METADATA_FILE: &str = "metadata.yml";

/// Parsed contents of a `metadata.yml` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    /// Service name as registered on the platform.
    pub name: String,
    /// Service version. YAML authors usually write `0.1` unquoted, so
    /// numbers are accepted; [`ServiceMetadata::parse`] keeps them exactly
    /// as written (`1.0` stays `1.0`).
    #[serde(default, deserialize_with = "version_text")]
    pub version: Option<String>,
    /// Service type (`query`, `map_filter`, `passthrough`, ...).
    #[serde(rename = "type")]
    pub service_type: String,
    /// Entry-point file relative to the descriptor.
    #[serde(default)]
    pub main_module: Option<String>,
}

impl ServiceMetadata {
    /// Read and parse a descriptor from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|reason| ArchiveError::InvalidMetadata {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse descriptor text.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut metadata: Self = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        if metadata.version.is_some() {
            if let Some(written) = plain_number(text, "version") {
                metadata.version = Some(written.to_string());
            }
        }
        Ok(metadata)
    }
}

/// The unquoted numeric scalar of a top-level `key: value` line, verbatim.
///
/// YAML numbers lose trailing zeros once parsed, and versions are compared
/// as text by the platform.
fn plain_number<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let value = line.strip_prefix(key)?.strip_prefix(':')?;
        let value = value.split(" #").next().unwrap_or(value).trim();
        (!value.is_empty() && value.parse::<f64>().is_ok()).then_some(value)
    })
}

fn version_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(x) => x.to_string(),
    }))
}

/// Locate the descriptor governing `directory`.
///
/// Tests `directory/metadata.yml`, then each parent in turn, and gives up
/// once `toplevel` has been checked. Both paths are expected in the same
/// (canonical) form.
///
/// # Errors
///
/// Returns [`ArchiveError::MetadataNotFound`] if no descriptor exists between
/// `directory` and `toplevel`, or if `directory` is not below `toplevel`.
pub fn find_metadata(directory: &Path, toplevel: &Path) -> Result<PathBuf> {
    for candidate in directory.ancestors() {
        if !candidate.starts_with(toplevel) {
            break;
        }
        let descriptor = candidate.join(METADATA_FILE);
        debug!(path = %descriptor.display(), "probing for metadata");
        if descriptor.is_file() {
            return Ok(descriptor);
        }
    }

    Err(ArchiveError::MetadataNotFound(toplevel.to_path_buf()))
}
