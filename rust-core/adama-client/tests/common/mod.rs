// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Shared fixtures: a scripted in-process transport that records requests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use adama_client::{Adama, ClientConfig, Method, RawResponse, Request, Result, Transport};
use serde_json::{json, Value};

pub const BASE: &str = "http://adama.test";
pub const TOKEN: &str = "tok";

type Responder = dyn Fn(&Request) -> RawResponse + Send + Sync;

/// Answers each request with a closure and keeps every request it saw.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&Request) -> RawResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests with the given method whose path (URL minus [`BASE`]) is `path`.
    pub fn count_of(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && path_of(r) == path)
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &Request) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.responder)(request))
    }
}

/// API path of a request, without the base URL.
pub fn path_of(request: &Request) -> &str {
    request.url.strip_prefix(BASE).unwrap_or(&request.url)
}

pub fn config() -> ClientConfig {
    ClientConfig::new(BASE)
        .unwrap()
        .with_token(TOKEN)
        .with_poll_interval(Duration::from_millis(10))
}

pub fn client(transport: &Arc<ScriptedTransport>) -> Adama {
    client_with(config(), transport)
}

pub fn client_with(config: ClientConfig, transport: &Arc<ScriptedTransport>) -> Adama {
    Adama::with_transport(config, transport.clone())
}

/// `200` with a success envelope around `result`.
pub fn success(result: Value) -> RawResponse {
    json_response(200, json!({"status": "success", "result": result}))
}

pub fn failure(message: &str) -> RawResponse {
    json_response(200, json!({"status": "error", "message": message}))
}

pub fn json_response(status: u16, body: Value) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

pub fn not_found() -> RawResponse {
    RawResponse::new(404, "not found")
}
