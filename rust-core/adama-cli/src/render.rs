// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! Output rendering for command results.
//!
//! - **Table**: columnar output using `comfy-table`.
//! - **JSON**: pretty-printed, as returned by the platform.

use std::fmt;
use std::str::FromStr;

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{Map, Value};

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown format '{other}'. Valid formats: table, json")),
        }
    }
}

pub fn render(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        OutputFormat::Table => render_table(value),
    }
}

/// A one-column listing (namespace names, service paths).
pub fn render_list(header: &str, items: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => render(&Value::from(items.to_vec()), format),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![Cell::new(header)]);
            for item in items {
                table.add_row(vec![Cell::new(item)]);
            }
            table.to_string()
        }
    }
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(rows) if !rows.is_empty() => render_rows(rows),
        Value::Object(obj) => render_object(obj),
        other => other.to_string(),
    }
}

/// Each object is a row; columns are the union of keys in first-seen order.
fn render_rows(rows: &[Value]) -> String {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(obj) = row {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if columns.is_empty() {
        table.set_header(vec![Cell::new("value")]);
        for item in rows {
            table.add_row(vec![Cell::new(cell_text(item))]);
        }
    } else {
        table.set_header(columns.iter().map(Cell::new));
        for row in rows {
            table.add_row(
                columns
                    .iter()
                    .map(|col| Cell::new(cell_text(row.get(col).unwrap_or(&Value::Null)))),
            );
        }
    }

    let count = rows.len();
    format!("{table}\n({count} row{})", if count == 1 { "" } else { "s" })
}

fn render_object(obj: &Map<String, Value>) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);
    for (key, val) in obj {
        table.add_row(vec![Cell::new(key), Cell::new(cell_text(val))]);
    }
    table.to_string()
}

/// Short cell text; large arrays and objects are summarised.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.len() > 3 => format!("[{} items]", arr.len()),
        Value::Object(obj) if obj.len() > 3 => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
