// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Version-control root discovery.
//!
//! A directory is a repository root when it contains a `.git` entry (a
//! directory for ordinary clones, a file for worktrees and submodules).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ArchiveError, Result};

/// Marker entry identifying a repository root.
pub const VCS_MARKER: &str = ".git";

/// Walk upward from `directory` and return the closest repository root.
///
/// # Errors
///
/// Returns [`ArchiveError::NotInRepository`] when no ancestor (including
/// `directory` itself) carries a `.git` marker.
pub fn find_vcs_root(directory: &Path) -> Result<PathBuf> {
    let start = directory.canonicalize()?;

    for candidate in start.ancestors() {
        if candidate.join(VCS_MARKER).exists() {
            debug!(root = %candidate.display(), "found repository root");
            return Ok(candidate.to_path_buf());
        }
    }

    Err(ArchiveError::NotInRepository(start))
}
