// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! PROV-JSON documents.
//!
//! The platform describes how a result was derived as a W3C PROV graph.
//! [`ProvDocument`] is a read-only view of the PROV-JSON serialisation:
//! namespace prefixes plus a flat list of records, each an element
//! (entity, activity, agent) or a relation between elements.
//!
//! # Architecture
//!
//! - **ProvKind**: the section a record came from (`entity`, `used`, ...).
//!   Unrecognised sections are kept as `Other(String)`.
//! - **ProvRecord**: one identified record with its attribute map.
//! - **ProvDocument**: prefixes and records, with per-kind accessors.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{AdamaError, Result};

/// Section of a PROV-JSON document a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProvKind {
    /// A thing (dataset, file, result row)
    Entity,
    /// Something that happened over time and acted on entities
    Activity,
    /// Someone or something bearing responsibility
    Agent,
    WasGeneratedBy,
    Used,
    WasDerivedFrom,
    WasAttributedTo,
    WasAssociatedWith,
    ActedOnBehalfOf,
    WasInformedBy,
    /// Any other PROV section (bundles, specialisations, ...)
    Other(String),
}

impl ProvKind {
    fn from_key(key: &str) -> Self {
        match key {
            "entity" => ProvKind::Entity,
            "activity" => ProvKind::Activity,
            "agent" => ProvKind::Agent,
            "wasGeneratedBy" => ProvKind::WasGeneratedBy,
            "used" => ProvKind::Used,
            "wasDerivedFrom" => ProvKind::WasDerivedFrom,
            "wasAttributedTo" => ProvKind::WasAttributedTo,
            "wasAssociatedWith" => ProvKind::WasAssociatedWith,
            "actedOnBehalfOf" => ProvKind::ActedOnBehalfOf,
            "wasInformedBy" => ProvKind::WasInformedBy,
            other => ProvKind::Other(other.to_string()),
        }
    }

    /// PROV-JSON section name.
    pub fn key(&self) -> &str {
        match self {
            ProvKind::Entity => "entity",
            ProvKind::Activity => "activity",
            ProvKind::Agent => "agent",
            ProvKind::WasGeneratedBy => "wasGeneratedBy",
            ProvKind::Used => "used",
            ProvKind::WasDerivedFrom => "wasDerivedFrom",
            ProvKind::WasAttributedTo => "wasAttributedTo",
            ProvKind::WasAssociatedWith => "wasAssociatedWith",
            ProvKind::ActedOnBehalfOf => "actedOnBehalfOf",
            ProvKind::WasInformedBy => "wasInformedBy",
            ProvKind::Other(name) => name,
        }
    }

    /// Entities, activities and agents are elements; the rest are relations.
    pub fn is_element(&self) -> bool {
        matches!(self, ProvKind::Entity | ProvKind::Activity | ProvKind::Agent)
    }
}

impl fmt::Display for ProvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One identified record of a PROV document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvRecord {
    pub kind: ProvKind,
    /// Qualified identifier, e.g. `adama:response_1`.
    pub id: String,
    pub attributes: Map<String, Value>,
}

impl ProvRecord {
    /// Attribute value as a string, when it is one.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// A parsed PROV-JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvDocument {
    prefixes: BTreeMap<String, String>,
    records: Vec<ProvRecord>,
}

impl ProvDocument {
    /// Build a document from decoded PROV-JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AdamaError::Api`] if the value is not an object, or if a
    /// section or record has the wrong shape.
    pub fn from_json(value: Value) -> Result<Self> {
        let sections = match value {
            Value::Object(sections) => sections,
            other => {
                return Err(AdamaError::api_with(
                    "provenance document is not a JSON object",
                    other,
                ))
            }
        };

        let mut document = ProvDocument::default();
        for (key, section) in sections {
            let entries = match section {
                Value::Object(entries) => entries,
                other => {
                    return Err(AdamaError::api_with(
                        format!("provenance section '{key}' is not an object"),
                        other,
                    ))
                }
            };

            if key == "prefix" {
                for (prefix, uri) in entries {
                    let uri = match uri {
                        Value::String(uri) => uri,
                        other => other.to_string(),
                    };
                    document.prefixes.insert(prefix, uri);
                }
                continue;
            }

            let kind = ProvKind::from_key(&key);
            for (id, body) in entries {
                // PROV-JSON uses an array when several records share an id.
                let bodies = match body {
                    Value::Array(items) => items,
                    single => vec![single],
                };
                for body in bodies {
                    let attributes = match body {
                        Value::Object(attributes) => attributes,
                        other => {
                            return Err(AdamaError::api_with(
                                format!("provenance record '{id}' in '{key}' is not an object"),
                                other,
                            ))
                        }
                    };
                    document.records.push(ProvRecord {
                        kind: kind.clone(),
                        id: id.clone(),
                        attributes,
                    });
                }
            }
        }

        Ok(document)
    }

    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    pub fn records(&self) -> &[ProvRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one kind, in document order.
    pub fn records_of(&self, kind: ProvKind) -> impl Iterator<Item = &ProvRecord> + '_ {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn entities(&self) -> Vec<&ProvRecord> {
        self.records_of(ProvKind::Entity).collect()
    }

    pub fn activities(&self) -> Vec<&ProvRecord> {
        self.records_of(ProvKind::Activity).collect()
    }

    pub fn agents(&self) -> Vec<&ProvRecord> {
        self.records_of(ProvKind::Agent).collect()
    }

    /// Every record that is not an element.
    pub fn relations(&self) -> Vec<&ProvRecord> {
        self.records.iter().filter(|r| !r.kind.is_element()).collect()
    }

    /// First record with the given identifier.
    pub fn record(&self, id: &str) -> Option<&ProvRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
