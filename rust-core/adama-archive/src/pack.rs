// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Gzip-compressed tar archives of a service source tree.

use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// File name used for the archive part of a registration upload.
pub const ARCHIVE_NAME: &str = "code.tgz";

/// Pack every entry below `directory` into an in-memory `.tgz`.
///
/// Entry names are relative to `directory`. Entries are added in file-name
/// order so packing the same tree twice yields the same member list.
/// Symbolic links are stored as links, not followed.
pub fn pack(directory: &Path) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut members = 0usize;
    for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(directory)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        if entry.file_type().is_dir() {
            builder.append_dir(relative, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), relative)?;
        }
        members += 1;
    }

    let bytes = builder.into_inner()?.finish()?;
    debug!(
        directory = %directory.display(),
        members,
        bytes = bytes.len(),
        "packed service tree"
    );
    Ok(bytes)
}
