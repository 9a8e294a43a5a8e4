// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Adama client SDK.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, AdamaError>`. [`AdamaError::Api`] is the domain
//! error: the server (or the local registration pipeline) refused the
//! operation and said why. The remaining variants describe transport and
//! decoding failures underneath it.

use std::time::Duration;

use adama_archive::ArchiveError;
use thiserror::Error;

/// Error type for Adama client operations.
#[derive(Error, Debug)]
pub enum AdamaError {
    /// The platform rejected the request, or a client-side precondition of a
    /// domain operation failed. `context` carries the decoded envelope when
    /// one was available.
    #[error("{message}")]
    Api {
        /// Human-readable reason.
        message: String,
        /// Decoded response body, if any.
        context: Option<serde_json::Value>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response text.
        body: String,
    },

    /// Registration did not complete before the deadline.
    #[error("timeout registering service after {}ms", .elapsed.as_millis())]
    Timeout {
        /// Time spent polling.
        elapsed: Duration,
    },

    /// An underlying HTTP / network transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body was not the JSON that was expected.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Packaging the local module failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Local filesystem failure (e.g. writing a provenance image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured base URL is unusable.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl AdamaError {
    /// Build an [`AdamaError::Api`] without context.
    pub fn api(message: impl Into<String>) -> Self {
        AdamaError::Api {
            message: message.into(),
            context: None,
        }
    }

    /// Build an [`AdamaError::Api`] carrying the offending body.
    pub fn api_with(message: impl Into<String>, context: serde_json::Value) -> Self {
        AdamaError::Api {
            message: message.into(),
            context: Some(context),
        }
    }

    /// Whether this is a domain-level refusal rather than a transport fault.
    pub fn is_domain(&self) -> bool {
        match self {
            AdamaError::Api { .. } | AdamaError::Timeout { .. } => true,
            AdamaError::Archive(err) => !matches!(err, ArchiveError::Io(_) | ArchiveError::Walk(_)),
            _ => false,
        }
    }

    /// The context object attached to a domain error.
    pub fn context(&self) -> Option<&serde_json::Value> {
        match self {
            AdamaError::Api { context, .. } => context.as_ref(),
            _ => None,
        }
    }
}

/// Crate-level result alias using [`AdamaError`].
pub type Result<T> = std::result::Result<T, AdamaError>;
