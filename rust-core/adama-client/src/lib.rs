// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Adama Client SDK
//!
//! A blocking Rust client for the Adama service platform: browse namespaces
//! and services, register new services from local code, call endpoints and
//! fetch the provenance of their results.
//!
//! Handles are lazy. Asking for a namespace, service or endpoint makes no
//! request; the first lookup that needs remote data fetches it once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use adama_client::{Adama, ProvFormat, RegisterOptions};
//!
//! fn main() -> adama_client::Result<()> {
//!     let adama = Adama::with_token("https://adama.example.org/community/v0.3", "token")?;
//!     let ns = adama.namespace("araport");
//!     let service = ns.add_service(Path::new("services/genes/main.py"), &RegisterOptions::default())?;
//!
//!     let output = service.endpoint("search").call(&[("q", "AT1G01010")])?;
//!     if let Some(rows) = output.into_results() {
//!         println!("{} rows", rows.len());
//!         println!("{:?}", rows.prov(ProvFormat::ProvN)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: the [`Adama`] root handle and HTTP helpers.
//! - [`namespace`], [`service`], [`endpoint`]: the lazy resource graph.
//! - [`registration`]: upload and readiness polling for new services.
//! - [`result`]: endpoint results and provenance retrieval.
//! - [`prov`]: PROV-JSON document model.
//! - [`transport`]: the HTTP seam and `Link` header parsing.
//! - [`config`], [`error`]: settings, constants, and the error type.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod handle;
pub mod namespace;
pub mod prov;
pub mod registration;
pub mod result;
pub mod service;
pub mod transport;

pub use client::{Adama, NewNamespace};
pub use config::{ClientConfig, DEFAULT_VERSION, POLL_INTERVAL, REGISTER_TIMEOUT, REQUEST_TIMEOUT};
pub use endpoint::{Endpoint, EndpointOutput, STRUCTURED_TYPES};
pub use error::{AdamaError, Result};
pub use handle::Handle;
pub use namespace::{Namespace, DELETED};
pub use prov::{ProvDocument, ProvKind, ProvRecord};
pub use registration::{RegisterOptions, Registration, RegistrationStatus};
pub use result::{ProvFormat, ProvResult, Provenance};
pub use service::{Service, ServiceState};
pub use transport::{
    parse_link_header, FilePart, HttpTransport, Link, Method, RawResponse, Request, Transport,
    PROVENANCE_REL,
};

pub use adama_archive::{create_stub, ArchiveError, METADATA_FILE};
