// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Endpoint results with attached provenance.
//!
//! A [`ProvResult`] is the decoded `result` list of an endpoint call plus
//! the provenance URI advertised by the response that produced it. The URI
//! is fixed at construction; provenance itself is only fetched when asked
//! for, in one of the formats of [`ProvFormat`].

use std::fmt;
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::Adama;
use crate::error::{AdamaError, Result};
use crate::prov::ProvDocument;
use crate::transport::RawResponse;

/// Representation requested from the provenance service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvFormat {
    /// PROV-JSON, decoded.
    #[default]
    Json,
    /// Source listing, decoded JSON.
    Sources,
    /// PROV-N text notation.
    ProvN,
    /// PROV-JSON parsed into a [`ProvDocument`].
    Prov,
    /// Rendered graph image.
    Png,
}

impl ProvFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvFormat::Json => "json",
            ProvFormat::Sources => "sources",
            ProvFormat::ProvN => "prov-n",
            ProvFormat::Prov => "prov",
            ProvFormat::Png => "png",
        }
    }
}

impl fmt::Display for ProvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProvFormat {
    type Err = AdamaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ProvFormat::Json),
            "sources" => Ok(ProvFormat::Sources),
            "prov-n" | "provn" => Ok(ProvFormat::ProvN),
            "prov" => Ok(ProvFormat::Prov),
            "png" => Ok(ProvFormat::Png),
            other => Err(AdamaError::api(format!("unknown provenance format: {other}"))),
        }
    }
}

/// Provenance in the requested representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Json(Value),
    Text(String),
    Document(ProvDocument),
    Image(Vec<u8>),
}

/// Result list of a structured endpoint call.
#[derive(Debug, Clone)]
pub struct ProvResult {
    items: Vec<Value>,
    prov_url: Option<String>,
    client: Adama,
}

impl ProvResult {
    pub(crate) fn new(items: Vec<Value>, prov_url: Option<String>, client: Adama) -> Self {
        Self {
            items,
            prov_url,
            client,
        }
    }

    /// Provenance URI taken from the response's link header.
    pub fn prov_url(&self) -> Option<&str> {
        self.prov_url.as_deref()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    fn fetch(&self, format: ProvFormat) -> Result<RawResponse> {
        let url = self
            .prov_url
            .as_deref()
            .ok_or_else(|| AdamaError::api("no provenance information found"))?;
        debug!(%url, %format, "fetching provenance");
        self.client.fetch_url(url, &[("format", format.as_str())])
    }

    /// Fetch provenance in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`AdamaError::Api`] if the originating response carried no
    /// provenance link.
    pub fn prov(&self, format: ProvFormat) -> Result<Provenance> {
        let response = self.fetch(format)?;
        Ok(match format {
            ProvFormat::Json | ProvFormat::Sources => Provenance::Json(response.json()?),
            ProvFormat::ProvN => Provenance::Text(response.text()),
            ProvFormat::Prov => Provenance::Document(ProvDocument::from_json(response.json()?)?),
            ProvFormat::Png => Provenance::Image(response.body),
        })
    }

    /// Fetch provenance in `format` and write the response body to `path`.
    pub fn save_prov(&self, format: ProvFormat, path: &Path) -> Result<()> {
        let response = self.fetch(format)?;
        fs::write(path, &response.body)?;
        info!(path = %path.display(), %format, "saved provenance");
        Ok(())
    }
}

impl Deref for ProvResult {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.items
    }
}

impl PartialEq<Vec<Value>> for ProvResult {
    fn eq(&self, other: &Vec<Value>) -> bool {
        &self.items == other
    }
}

impl PartialEq<[Value]> for ProvResult {
    fn eq(&self, other: &[Value]) -> bool {
        self.items == other
    }
}

impl<'a> IntoIterator for &'a ProvResult {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ProvResult {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
