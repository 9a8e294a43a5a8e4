// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Adama Archive
//!
//! Local-side helpers for registering a service on the Adama platform:
//!
//! - [`vcs`]: find the repository root that bounds a service.
//! - [`pack`]: compress a source tree into a `.tgz` upload.
//! - [`metadata`]: locate and parse the `metadata.yml` descriptor.
//! - [`package`]: combine the three into a [`CodePackage`].
//! - [`stub`]: generate a starter service directory.

pub mod error;
pub mod metadata;
pub mod pack;
pub mod package;
pub mod stub;
pub mod vcs;

pub use error::{ArchiveError, Result};
pub use metadata::{find_metadata, ServiceMetadata, METADATA_FILE};
pub use pack::{pack, ARCHIVE_NAME};
pub use package::CodePackage;
pub use stub::create_stub;
pub use vcs::find_vcs_root;
