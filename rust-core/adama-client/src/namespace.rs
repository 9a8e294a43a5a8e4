// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Lazy namespace handles.
//!
//! A [`Namespace`] is created without touching the network. The first lookup
//! of a public key fetches `GET /{namespace}` once and caches the returned
//! fields; later lookups are answered from that cache. Keys that are not
//! fields resolve to [`Service`] handles.

use serde_json::{Map, Value};
use tracing::info;

use crate::client::{envelope_result, Adama};
use crate::error::Result;
use crate::handle::{is_private, Handle};
use crate::service::Service;

/// Name given to a handle after its remote namespace has been deleted.
pub const DELETED: &str = "<deleted>";

/// A namespace on the platform.
#[derive(Debug, Clone)]
pub struct Namespace {
    client: Adama,
    name: String,
    info: Option<Map<String, Value>>,
}

impl Namespace {
    pub(crate) fn new(client: Adama, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            info: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Adama {
        &self.client
    }

    /// API path of this namespace, `/{name}`.
    pub fn path(&self) -> String {
        format!("/{}", self.name)
    }

    pub fn is_loaded(&self) -> bool {
        self.info.is_some()
    }

    /// Cached remote fields, if already loaded.
    pub fn info(&self) -> Option<&Map<String, Value>> {
        self.info.as_ref()
    }

    /// Fetch the namespace record unless it is already cached.
    ///
    /// The cache is filled at most once per handle; it is never refreshed.
    pub fn ensure_loaded(&mut self) -> Result<&Map<String, Value>> {
        let info = match self.info.take() {
            Some(info) => info,
            None => self.preload()?,
        };
        Ok(&*self.info.insert(info))
    }

    fn preload(&self) -> Result<Map<String, Value>> {
        let result = envelope_result(self.client.get_json(&self.path(), &[])?);
        Ok(match result {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert("result".to_string(), other);
                fields
            }
        })
    }

    /// Value of a remote field.
    ///
    /// Private keys are answered from the cache only.
    pub fn field(&mut self, key: &str) -> Result<Option<&Value>> {
        if is_private(key) {
            return Ok(self.info.as_ref().and_then(|info| info.get(key)));
        }
        Ok(self.ensure_loaded()?.get(key))
    }

    /// Resolve `key` to a field of this namespace or, failing that, to the
    /// service of that name.
    pub fn get(&mut self, key: &str) -> Result<Handle> {
        if !is_private(key) {
            self.ensure_loaded()?;
        }
        Ok(match self.info.as_ref().and_then(|info| info.get(key)) {
            Some(value) => Handle::Field(value.clone()),
            None => Handle::Service(self.service(key)),
        })
    }

    /// Handle for the service `name` at the default version. No request is
    /// made.
    pub fn service(&self, name: &str) -> Service {
        let version = self.client.config().default_version.clone();
        Service::new(self.client.clone(), &self.name, name, version)
    }

    /// Services registered in this namespace, each at its listed version.
    pub fn services(&self) -> Result<Vec<Service>> {
        let listing = envelope_result(
            self.client
                .get_json(&format!("{}/services", self.path()), &[])?,
        );
        let default_version = &self.client.config().default_version;

        Ok(listing
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let name = entry.get("name")?.as_str()?;
                        let version = match entry.get("version") {
                            Some(Value::String(v)) => v.clone(),
                            Some(Value::Number(n)) => n.to_string(),
                            _ => default_version.clone(),
                        };
                        Some(Service::new(self.client.clone(), &self.name, name, version))
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Delete the namespace on the server and invalidate this handle.
    pub fn delete(&mut self) -> Result<()> {
        self.client.delete(&self.path())?;
        info!(namespace = %self.name, "deleted namespace");
        self.info = None;
        self.name = DELETED.to_string();
        Ok(())
    }
}
