use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ScraperError;
use crate::storage::AtomicCsvWriter;

use super::flatten::{cell_text, flatten_record};

/// Flattened rows from one endpoint. Columns are the union of row keys in
/// first-seen order; a row missing a column renders as an empty cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl RecordTable {
    /// Build a table from a response body holding an object or an array of
    /// objects. Returns the reason on any other shape.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let records = match body {
            Value::Object(map) => vec![map],
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(format!(
                        "element {i} is {}, expected an object",
                        json_kind(&other)
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(format!(
                    "body is {}, expected an object or an array of objects",
                    json_kind(&other)
                ))
            }
        };

        let mut table = Self::default();
        for record in &records {
            table.push(flatten_record(record));
        }
        Ok(table)
    }

    fn push(&mut self, row: Map<String, Value>) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ScraperError> {
        let mut writer = AtomicCsvWriter::new(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default()),
            )?;
        }
        writer.finish()?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
