//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::model::{Row, Table};

use super::OutputFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonStyle {
    Pretty,
    Compact,
    Lines,
}

/// JSON output formatter
///
/// Writes an array of objects keyed by column name, or one object per line.
pub struct JsonOutput {
    style: JsonStyle,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self {
            style: JsonStyle::Pretty,
        }
    }

    pub fn compact() -> Self {
        Self {
            style: JsonStyle::Compact,
        }
    }

    pub fn lines() -> Self {
        Self {
            style: JsonStyle::Lines,
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn row_object(row: &Row<'_>) -> Value {
    let object: Map<String, Value> = row
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_json()))
        .collect();
    Value::Object(object)
}

impl OutputFormatter for JsonOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        match self.style {
            JsonStyle::Lines => {
                for row in table.rows() {
                    serde_json::to_writer(&mut *writer, &row_object(&row))?;
                    writeln!(writer)?;
                }
            }
            JsonStyle::Pretty | JsonStyle::Compact => {
                let rows: Vec<Value> = table.rows().map(|row| row_object(&row)).collect();
                if self.style == JsonStyle::Pretty {
                    serde_json::to_writer_pretty(&mut *writer, &rows)?;
                } else {
                    serde_json::to_writer(&mut *writer, &rows)?;
                }
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}
