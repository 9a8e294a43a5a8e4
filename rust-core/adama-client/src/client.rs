// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Adama client: credentials, request helpers, and the root of the resource
//! graph.
//!
//! [`Adama`] is the entry point for all SDK operations. It is cheap to clone
//! (the configuration and transport sit behind an `Arc`), and every lazy
//! handle it hands out keeps its own clone.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{AdamaError, Result};
use crate::handle::Handle;
use crate::namespace::Namespace;
use crate::transport::{FilePart, HttpTransport, Method, RawResponse, Request, Transport};

struct Inner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

/// The Adama platform client.
///
/// # Examples
///
/// ```rust,no_run
/// use adama_client::{Adama, EndpointOutput};
///
/// # fn main() -> adama_client::Result<()> {
/// let adama = Adama::with_token("https://adama.example.org/community/v0.3", "token")?;
/// let genes = adama.namespace("araport").service("gene_summary");
/// if let EndpointOutput::Results(rows) = genes.endpoint("search").call(&[("q", "AT1G01010")])? {
///     println!("{} rows, provenance at {:?}", rows.len(), rows.prov_url());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Adama {
    inner: Arc<Inner>,
}

impl fmt::Debug for Adama {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adama")
            .field("base_url", &self.inner.config.base_url)
            .field("verify_tls", &self.inner.config.verify_tls)
            .finish_non_exhaustive()
    }
}

/// Form fields for `POST /namespaces`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewNamespace {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl NewNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = vec![("name", self.name.as_str())];
        if let Some(url) = &self.url {
            fields.push(("url", url.as_str()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.as_str()));
        }
        fields
    }
}

impl Adama {
    // -- Constructors -------------------------------------------------------

    /// Create an unauthenticated client pointing at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(ClientConfig::new(base_url)?)
    }

    /// Create a client that authenticates with a bearer token.
    pub fn with_token(base_url: &str, token: &str) -> Result<Self> {
        Self::from_config(ClientConfig::new(base_url)?.with_token(token))
    }

    /// Create a client over HTTP using `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary [`Transport`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner { config, transport }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // -- Resource graph -----------------------------------------------------

    /// Handle for the namespace `name`. No request is made.
    pub fn namespace(&self, name: &str) -> Namespace {
        Namespace::new(self.clone(), name)
    }

    /// Resolve `name` at the root of the graph. Every name is a namespace.
    pub fn lookup(&self, name: &str) -> Handle {
        Handle::Namespace(self.namespace(name))
    }

    /// `GET /status`.
    pub fn status(&self) -> Result<Value> {
        self.get_json("/status", &[])
    }

    /// All namespaces visible to the caller.
    pub fn namespaces(&self) -> Result<Vec<Namespace>> {
        let listing = envelope_result(self.get_json("/namespaces", &[])?);
        Ok(names_in(&listing)
            .into_iter()
            .map(|name| self.namespace(&name))
            .collect())
    }

    /// Create a namespace and return a handle to it.
    pub fn add_namespace(&self, new_ns: &NewNamespace) -> Result<Namespace> {
        let response = self.post("/namespaces", &new_ns.fields(), Vec::new())?;
        check_envelope(response.json()?)?;
        info!(namespace = %new_ns.name, "created namespace");
        Ok(self.namespace(&new_ns.name))
    }

    // -- HTTP helpers -------------------------------------------------------

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.config.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Request {
        Request::new(method, self.url(path)).bearer(self.inner.config.token.as_deref())
    }

    fn send(&self, request: Request) -> Result<RawResponse> {
        debug!(method = %request.method, url = %request.url, "adama request");
        self.inner.transport.execute(&request)?.error_for_status()
    }

    /// Authenticated GET. Non-2xx responses become [`AdamaError::Status`].
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<RawResponse> {
        self.send(self.request(Method::Get, path).query(params))
    }

    /// Authenticated GET returning the decoded success envelope.
    ///
    /// # Errors
    ///
    /// Returns [`AdamaError::Api`] when the envelope's `status` is not
    /// `"success"`; the decoded body is attached as context.
    pub fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        check_envelope(self.get(path, params)?.json()?)
    }

    /// Authenticated POST with form fields and optional file parts.
    pub fn post(
        &self,
        path: &str,
        form: &[(&str, &str)],
        files: Vec<FilePart>,
    ) -> Result<RawResponse> {
        self.send(self.request(Method::Post, path).form(form).files(files))
    }

    /// Authenticated DELETE.
    pub fn delete(&self, path: &str) -> Result<RawResponse> {
        self.send(self.request(Method::Delete, path))
    }

    /// Unauthenticated GET on an absolute URL (provenance links and other
    /// server-issued URLs).
    pub fn fetch_url(&self, url: &str, params: &[(&str, &str)]) -> Result<RawResponse> {
        self.send(Request::new(Method::Get, url).query(params))
    }
}

/// Accept a `{"status": "success", ...}` envelope, reject anything else.
pub(crate) fn check_envelope(envelope: Value) -> Result<Value> {
    if envelope.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(envelope);
    }

    let message = envelope
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    warn!(%message, "API reported failure");
    Err(AdamaError::api_with(message, envelope))
}

/// Take the `result` member out of an envelope.
pub(crate) fn envelope_result(envelope: Value) -> Value {
    match envelope {
        Value::Object(mut fields) => fields.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// `name` members of a listing such as `[{"name": "a"}, {"name": "b"}]`.
fn names_in(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_envelope_success() {
        let envelope = json!({"status": "success", "result": [1]});
        assert_eq!(check_envelope(envelope.clone()).unwrap(), envelope);
    }

    #[test]
    fn test_check_envelope_error_carries_body() {
        let envelope = json!({"status": "error", "message": "no such namespace"});
        match check_envelope(envelope.clone()) {
            Err(AdamaError::Api { message, context }) => {
                assert_eq!(message, "no such namespace");
                assert_eq!(context, Some(envelope));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_envelope_without_status() {
        assert!(check_envelope(json!({"result": 1})).is_err());
        assert!(check_envelope(json!([1, 2])).is_err());
    }

    #[test]
    fn test_envelope_result() {
        assert_eq!(envelope_result(json!({"result": {"a": 1}})), json!({"a": 1}));
        assert_eq!(envelope_result(json!({"status": "success"})), Value::Null);
    }

    #[test]
    fn test_names_in_skips_unnamed_entries() {
        let listing = json!([{"name": "a"}, {"url": "x"}, {"name": "b"}]);
        assert_eq!(names_in(&listing), vec!["a", "b"]);
        assert!(names_in(&json!(null)).is_empty());
    }

    #[test]
    fn test_new_namespace_fields() {
        let new_ns = NewNamespace {
            name: "araport".to_string(),
            url: None,
            description: Some("plants".to_string()),
        };
        assert_eq!(
            new_ns.fields(),
            vec![("name", "araport"), ("description", "plants")]
        );
    }
}
