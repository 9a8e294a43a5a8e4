// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Service endpoints.
//!
//! An [`Endpoint`] holds no response state: every [`call`](Endpoint::call)
//! is a fresh `GET /{namespace}/{service}_v{version}/{endpoint}`. Services
//! of the structured types answer with a JSON envelope whose `result` list
//! is wrapped in a [`ProvResult`]; anything else is handed back raw.

use serde_json::Value;
use tracing::debug;

use crate::client::{check_envelope, envelope_result};
use crate::error::{AdamaError, Result};
use crate::result::ProvResult;
use crate::service::{Service, ServiceState};
use crate::transport::RawResponse;

/// Service types whose endpoints return a JSON result list.
pub const STRUCTURED_TYPES: [&str; 2] = ["query", "map_filter"];

/// What an endpoint call produced.
#[derive(Debug, Clone)]
pub enum EndpointOutput {
    /// Decoded result list with its provenance link.
    Results(ProvResult),
    /// Undecoded response (passthrough services, binary payloads).
    Raw(RawResponse),
}

impl EndpointOutput {
    pub fn into_results(self) -> Option<ProvResult> {
        match self {
            EndpointOutput::Results(results) => Some(results),
            EndpointOutput::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<RawResponse> {
        match self {
            EndpointOutput::Raw(response) => Some(response),
            EndpointOutput::Results(_) => None,
        }
    }
}

/// A named operation of a service.
#[derive(Debug, Clone)]
pub struct Endpoint {
    service: Service,
    name: String,
}

impl Endpoint {
    pub(crate) fn new(service: Service, name: &str) -> Self {
        Self {
            service,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// API path of the endpoint.
    pub fn path(&self) -> String {
        format!("{}/{}", self.service.full_name(), self.name)
    }

    /// Invoke the endpoint with query parameters.
    ///
    /// Loads the owning service first if needed, since its type decides how
    /// the response is decoded.
    ///
    /// # Errors
    ///
    /// - [`AdamaError::Status`] for a non-2xx response (body text attached).
    /// - [`AdamaError::Api`] for a failure envelope, or when the service is
    ///   errored or not yet available.
    pub fn call(&mut self, params: &[(&str, &str)]) -> Result<EndpointOutput> {
        let service_type = self.resolve_type()?;
        let client = self.service.client().clone();
        let response = client.get(&self.path(), params)?;

        if !STRUCTURED_TYPES.contains(&service_type.as_str()) {
            debug!(endpoint = %self.path(), %service_type, "returning raw response");
            return Ok(EndpointOutput::Raw(response));
        }

        let prov_url = response.prov_link();
        let items = match envelope_result(check_envelope(response.json()?)?) {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        debug!(endpoint = %self.path(), items = items.len(), "decoded results");
        Ok(EndpointOutput::Results(ProvResult::new(items, prov_url, client)))
    }

    fn resolve_type(&mut self) -> Result<String> {
        let full_name = self.service.full_name();
        match self.service.ensure_loaded()? {
            ServiceState::Loaded(fields) => Ok(fields
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()),
            ServiceState::Errored(message) => Err(AdamaError::api(message.clone())),
            ServiceState::Unloaded => Err(AdamaError::api(format!(
                "service {full_name} is not available"
            ))),
        }
    }
}
