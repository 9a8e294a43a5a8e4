// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! HTTP transport layer.
//!
//! The client never talks to `reqwest` directly; it builds a [`Request`] and
//! hands it to a [`Transport`]. [`HttpTransport`] is the production
//! implementation (blocking `reqwest`, rustls). Tests plug in scripted
//! transports to observe exactly which requests a lazy handle issues.

use std::fmt;

use reqwest::blocking::multipart;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, LINK};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AdamaError, Result};

/// Link relation under which endpoint responses advertise their provenance.
pub const PROVENANCE_REL: &str = "http://www.w3.org/ns/prov#has_provenance";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// HTTP verbs used by the Adama API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A file uploaded as one part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// A fully-resolved outgoing request.
///
/// Requests carrying [`files`](Request::files) are sent as
/// `multipart/form-data` with the form fields as text parts; requests with
/// only form fields are sent url-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub files: Vec<FilePart>,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            files: Vec::new(),
            bearer: None,
        }
    }

    pub fn query(mut self, params: &[(&str, &str)]) -> Self {
        self.query
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.form
            .extend(fields.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn files(mut self, files: Vec<FilePart>) -> Self {
        self.files.extend(files);
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_owned);
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    /// Value of a form field, if present.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        lookup(&self.form, name)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Append a header (builder style).
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body).map_err(AdamaError::Serialization)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Turn a non-2xx response into [`AdamaError::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AdamaError::Status {
                status: self.status,
                body: self.text(),
            })
        }
    }

    /// All links advertised through `Link` headers.
    pub fn links(&self) -> Vec<Link> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_link_header)
            .collect()
    }

    /// Target of the provenance link relation, if advertised.
    pub fn prov_link(&self) -> Option<String> {
        self.links()
            .into_iter()
            .find(|link| link.has_rel(PROVENANCE_REL))
            .map(|link| link.url)
    }
}

// ---------------------------------------------------------------------------
// Link header parsing (RFC 8288)
// ---------------------------------------------------------------------------

/// One `<uri>; rel="..."` element of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Raw `rel` parameter; may hold several space-separated relations.
    pub rel: Option<String>,
}

impl Link {
    pub fn has_rel(&self, relation: &str) -> bool {
        self.rel
            .as_deref()
            .is_some_and(|rel| rel.split_whitespace().any(|r| r == relation))
    }
}

/// Parse a `Link` header value into its elements.
///
/// Malformed elements are skipped rather than failing the whole header.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let Some(after_open) = rest.strip_prefix('<') else {
            match rest.find(',') {
                Some(i) => {
                    rest = &rest[i + 1..];
                    continue;
                }
                None => break,
            }
        };
        let Some(close) = after_open.find('>') else {
            break;
        };
        let url = after_open[..close].trim().to_string();
        rest = &after_open[close + 1..];

        let mut rel = None;
        loop {
            rest = rest.trim_start();
            let Some(after_semi) = rest.strip_prefix(';') else {
                break;
            };
            let (name, param, remaining) = parse_param(after_semi);
            rest = remaining;
            // First occurrence wins.
            if rel.is_none() && name.eq_ignore_ascii_case("rel") {
                rel = param;
            }
        }

        links.push(Link { url, rel });
    }

    links
}

fn parse_param(input: &str) -> (&str, Option<String>, &str) {
    let input = input.trim_start();
    let name_end = input
        .find(|c: char| c == '=' || c == ';' || c == ',')
        .unwrap_or(input.len());
    let name = input[..name_end].trim();
    let rest = &input[name_end..];

    let Some(value) = rest.strip_prefix('=') else {
        return (name, None, rest);
    };
    let value = value.trim_start();

    if let Some(quoted) = value.strip_prefix('"') {
        let mut text = String::new();
        let mut chars = quoted.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        text.push(escaped);
                    }
                }
                '"' => return (name, Some(text), &quoted[i + 1..]),
                _ => text.push(c),
            }
        }
        (name, Some(text), "")
    } else {
        let end = value
            .find(|c: char| c == ';' || c == ',')
            .unwrap_or(value.len());
        (name, Some(value[..end].trim().to_string()), &value[end..])
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Executes requests against the platform.
///
/// Implementations return every response they receive, whatever its status;
/// status handling belongs to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Request) -> Result<RawResponse>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport honouring the timeout and TLS settings of `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Already installed by an earlier client in this process is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(AdamaError::Network)?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> Result<RawResponse> {
        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
            Method::Delete => self.http.delete(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        if !request.files.is_empty() {
            let mut form = multipart::Form::new();
            for (name, value) in &request.form {
                form = form.text(name.clone(), value.clone());
            }
            for file in &request.files {
                let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                form = form.part(file.field.clone(), part);
            }
            builder = builder.multipart(form);
        } else if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(AdamaError::Network)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(AdamaError::Network)?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "received response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
