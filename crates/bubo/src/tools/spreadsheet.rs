//! Spreadsheet read tool
//!
//! Opens a local workbook, takes its first sheet and converts rows into
//! records keyed by the header row.

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::errors::DomainError;
use crate::tools::Tool;

const NAME: &str = "read_spreadsheet";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    file_path: String,
}

/// Parses a local spreadsheet file into a sequence of records.
#[derive(Default)]
pub struct SpreadsheetReadTool;

impl SpreadsheetReadTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for SpreadsheetReadTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Read a local spreadsheet file and return its first sheet as records keyed by the header row"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the spreadsheet file on the server"
                }
            },
            "required": ["filePath"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, DomainError> {
        let input: Input = serde_json::from_value(input)
            .map_err(|e| DomainError::invalid_input(NAME, e))?;
        read_first_sheet(&input.file_path)
    }
}

/// Open `path` and convert its first sheet into JSON records.
fn read_first_sheet(path: &str) -> Result<Value, DomainError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        DomainError::ExternalService(format!("failed to open spreadsheet {}: {}", path, e))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            DomainError::ExternalService(format!("spreadsheet {} has no sheets", path))
        })?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        DomainError::ExternalService(format!(
            "failed to read sheet '{}' of {}: {}",
            sheet_name, path, e
        ))
    })?;

    Ok(Value::Array(rows_to_records(range.rows())))
}

/// Convert rows into objects keyed by the first (header) row.
///
/// Empty cells are omitted from the records, matching the behavior of the
/// usual sheet-to-JSON conversions.
fn rows_to_records<'a, I>(mut rows: I) -> Vec<Value>
where
    I: Iterator<Item = &'a [Data]>,
{
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_header).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut record = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() || matches!(cell, Data::Empty) {
                continue;
            }
            record.insert(header.clone(), cell_to_value(cell));
        }
        Value::Object(record)
    })
    .collect()
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::from(*i),
        // Whole floats come back from xlsx cells holding integers
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(*f as i64)
        }
        Data::Float(f) => Value::from(*f),
        Data::String(s) => Value::from(s.clone()),
        Data::Bool(b) => Value::from(*b),
        Data::DateTime(dt) => Value::from(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::from(s.clone()),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}
