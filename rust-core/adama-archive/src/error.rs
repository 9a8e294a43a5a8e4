// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for service packaging.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, describing, or packing service code.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// No version-control root was found above the module directory.
    #[error("module not in a git repository: {}", .0.display())]
    NotInRepository(PathBuf),

    /// The upward search reached the repository root without finding a
    /// `metadata.yml` descriptor.
    #[error("could not find metadata file in directory: {}", .0.display())]
    MetadataNotFound(PathBuf),

    /// The descriptor exists but could not be parsed.
    #[error("invalid metadata file {}: {reason}", .path.display())]
    InvalidMetadata {
        /// Location of the offending descriptor.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A stub target directory is already present.
    #[error("target already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Filesystem failure while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed part-way through the tree.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Crate-level result alias using [`ArchiveError`].
pub type Result<T> = std::result::Result<T, ArchiveError>;
