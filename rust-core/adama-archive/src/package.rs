// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Collect everything a registration upload needs from a local module.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::metadata::{find_metadata, ServiceMetadata};
use crate::pack::pack;
use crate::vcs::find_vcs_root;

/// A packed service ready for upload.
#[derive(Debug, Clone)]
pub struct CodePackage {
    /// Gzip-compressed tar of the whole repository.
    pub archive: Vec<u8>,
    /// Parsed descriptor.
    pub metadata: ServiceMetadata,
    /// Directory holding the descriptor, relative to `root`, `/`-separated.
    /// Empty when the descriptor sits at the repository root.
    pub metadata_dir: String,
    /// Repository root that was packed.
    pub root: PathBuf,
}

impl CodePackage {
    /// Package the repository containing `module`.
    ///
    /// `module` may be a source file or its directory. The repository root
    /// above it is packed in full, and the descriptor nearest to the module
    /// supplies the service name and type.
    pub fn collect(module: &Path) -> Result<Self> {
        let module = module.canonicalize()?;
        let module_dir = if module.is_file() {
            module.parent().map(Path::to_path_buf).unwrap_or(module)
        } else {
            module
        };

        let root = find_vcs_root(&module_dir)?;
        let archive = pack(&root)?;
        let descriptor = find_metadata(&module_dir, &root)?;
        let metadata = ServiceMetadata::load(&descriptor)?;
        let metadata_dir = descriptor
            .parent()
            .and_then(|dir| dir.strip_prefix(&root).ok())
            .map(slash_path)
            .unwrap_or_default();

        debug!(
            service = %metadata.name,
            metadata_dir = %metadata_dir,
            "collected service package"
        );

        Ok(Self {
            archive,
            metadata,
            metadata_dir,
            root,
        })
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
