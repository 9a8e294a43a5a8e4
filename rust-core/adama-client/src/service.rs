// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Lazy service handles.
//!
//! A [`Service`] addresses `/{namespace}/{name}_v{version}`. Its remote
//! record is fetched on first use and moves the handle through
//! [`ServiceState`]:
//!
//! ```text
//! Unloaded --preload--> Loaded        (record present)
//!          --preload--> Errored       (server reports slot == "error")
//!          --preload--> Unloaded      (record not published yet)
//! ```
//!
//! `Errored` is terminal: lookups on an errored handle answer `Missing`
//! without contacting the server again.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::client::{envelope_result, Adama};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::handle::{is_private, Handle};
use crate::namespace::DELETED;

/// Load state of a [`Service`] handle.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceState {
    /// Nothing fetched yet, or the service is still being provisioned.
    Unloaded,
    /// The service record, as returned by the server.
    Loaded(Map<String, Value>),
    /// The server reported a failed registration.
    Errored(String),
}

/// A versioned service within a namespace.
#[derive(Debug, Clone)]
pub struct Service {
    client: Adama,
    namespace: String,
    name: String,
    version: String,
    state: ServiceState,
}

impl Service {
    pub(crate) fn new(
        client: Adama,
        namespace: &str,
        name: &str,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.into(),
            state: ServiceState::Unloaded,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn client(&self) -> &Adama {
        &self.client
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ServiceState::Loaded(_))
    }

    /// Failure reported by the server, once errored.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ServiceState::Errored(message) => Some(message),
            _ => None,
        }
    }

    /// API path, `/{namespace}/{name}_v{version}`.
    pub fn full_name(&self) -> String {
        format!("/{}/{}_v{}", self.namespace, self.name, self.version)
    }

    /// Handle for another version of the same service.
    ///
    /// The new handle starts unloaded; `self` is unaffected.
    pub fn with_version(&self, version: &str) -> Service {
        Service::new(self.client.clone(), &self.namespace, &self.name, version)
    }

    /// Fetch the service record if the handle is unloaded.
    ///
    /// An errored or loaded handle returns its state without a request. A
    /// handle whose service is still being provisioned stays unloaded and
    /// will ask again next time.
    pub fn ensure_loaded(&mut self) -> Result<&ServiceState> {
        if self.state == ServiceState::Unloaded {
            self.state = self.preload()?;
        }
        Ok(&self.state)
    }

    fn preload(&self) -> Result<ServiceState> {
        let result = envelope_result(self.client.get_json(&self.full_name(), &[])?);

        if result.get("slot").and_then(Value::as_str) == Some("error") {
            let message = result
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("service registration failed")
                .to_string();
            warn!(service = %self.full_name(), %message, "service is in error state");
            return Ok(ServiceState::Errored(message));
        }

        match result.get("service") {
            Some(Value::Object(fields)) => Ok(ServiceState::Loaded(fields.clone())),
            _ => {
                debug!(service = %self.full_name(), "service not ready");
                Ok(ServiceState::Unloaded)
            }
        }
    }

    fn local_field(&self, key: &str) -> Option<Value> {
        match &self.state {
            ServiceState::Loaded(fields) => fields.get(key).cloned(),
            _ => None,
        }
    }

    /// Value of a remote field; `None` while unloaded or after an error.
    ///
    /// Private keys are answered from the cache only.
    pub fn field(&mut self, key: &str) -> Result<Option<Value>> {
        if !is_private(key) {
            self.ensure_loaded()?;
        }
        Ok(self.local_field(key))
    }

    /// Resolve `key` to a field of the service record or, failing that, to
    /// the endpoint of that name.
    ///
    /// Yields [`Handle::Missing`] when the service could not be loaded.
    pub fn get(&mut self, key: &str) -> Result<Handle> {
        if is_private(key) {
            return Ok(self.local_field(key).map_or(Handle::Missing, Handle::Field));
        }
        if !matches!(self.ensure_loaded()?, ServiceState::Loaded(_)) {
            return Ok(Handle::Missing);
        }
        Ok(match self.local_field(key) {
            Some(value) => Handle::Field(value),
            None => Handle::Endpoint(self.endpoint(key)),
        })
    }

    /// Handle for the endpoint `name`. No request is made.
    pub fn endpoint(&self, name: &str) -> Endpoint {
        Endpoint::new(self.clone(), name)
    }

    /// Service type from the loaded record (`query`, `map_filter`, ...).
    pub fn service_type(&self) -> Option<&str> {
        match &self.state {
            ServiceState::Loaded(fields) => fields.get("type").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Delete this version on the server and invalidate the handle.
    pub fn delete(&mut self) -> Result<()> {
        self.client.delete(&self.full_name())?;
        info!(service = %self.full_name(), "deleted service");
        self.state = ServiceState::Unloaded;
        self.name = DELETED.to_string();
        Ok(())
    }
}
