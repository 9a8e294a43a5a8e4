// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Starter layout for a new service.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ArchiveError, Result};
use crate::metadata::METADATA_FILE;
use crate::vcs::find_vcs_root;

/// Entry-point file written by [`create_stub`].
pub const MAIN_MODULE: &str = "main.py";

const MAIN_TEMPLATE: &str = "\
import json

def main(args, adama):
    print(json.dumps({'key': 'value'}))
";

/// Create a service skeleton in `target` (defaults to `./{name}`).
///
/// Writes `metadata.yml`, a starter `main.py`, and an empty `__init__.py`.
/// With `require_vcs` set, the target must sit inside an existing
/// repository so that it can later be registered.
///
/// Returns the directory that was created.
pub fn create_stub(
    name: &str,
    service_type: &str,
    target: Option<&Path>,
    require_vcs: bool,
) -> Result<PathBuf> {
    let target = target.map_or_else(|| PathBuf::from(name), Path::to_path_buf);
    if target.exists() {
        return Err(ArchiveError::AlreadyExists(target));
    }

    if require_vcs {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        find_vcs_root(&parent)?;
    }

    fs::create_dir_all(&target)?;
    fs::write(target.join(METADATA_FILE), metadata_text(name, service_type))?;
    fs::write(target.join(MAIN_MODULE), MAIN_TEMPLATE)?;
    fs::write(target.join("__init__.py"), "")?;

    info!(service = name, kind = service_type, target = %target.display(), "created service stub");
    Ok(target)
}

fn metadata_text(name: &str, service_type: &str) -> String {
    format!("---\nname: {name}\nversion: 0.1\ntype: {service_type}\nmain_module: {MAIN_MODULE}\n")
}
