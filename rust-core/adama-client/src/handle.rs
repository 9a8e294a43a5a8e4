// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Results of name resolution in the resource graph.
//!
//! Looking a name up on a [`Namespace`] or [`Service`] either finds a field
//! of the remote record or yields a child handle. Child handles are built
//! locally; whether the remote object exists is only discovered when the
//! child itself is used.

use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::namespace::Namespace;
use crate::service::Service;

/// Keys starting with this character never trigger remote loading.
pub const PRIVATE_PREFIX: char = '_';

/// Whether `key` follows the private-name convention.
pub fn is_private(key: &str) -> bool {
    key.starts_with(PRIVATE_PREFIX)
}

/// What a lookup resolved to.
#[derive(Debug, Clone)]
pub enum Handle {
    Namespace(Namespace),
    Service(Service),
    Endpoint(Endpoint),
    /// A field of the remote record.
    Field(Value),
    /// Nothing: a private key with no local value, or a service that has not
    /// loaded (still pending, or failed).
    Missing,
}

impl Handle {
    pub fn into_namespace(self) -> Option<Namespace> {
        match self {
            Handle::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn into_service(self) -> Option<Service> {
        match self {
            Handle::Service(srv) => Some(srv),
            _ => None,
        }
    }

    pub fn into_endpoint(self) -> Option<Endpoint> {
        match self {
            Handle::Endpoint(ep) => Some(ep),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Value> {
        match self {
            Handle::Field(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Handle::Missing)
    }
}
