//! JSON and newline-delimited JSON parser

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::model::{CellValue, Record, Table};

use super::Parser;

/// Parser for JSON arrays of objects, single objects and JSON lines
pub struct JsonParser;

impl JsonParser {
    /// Parse one JSON document: an array of objects or a single object
    pub fn from_reader<R: Read>(reader: R) -> Result<Table> {
        let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON")?;

        // Handle both arrays and single objects
        let array = match value {
            Value::Array(arr) => arr,
            Value::Object(_) => vec![value],
            _ => bail!("JSON must be an array or object"),
        };

        let records = array
            .iter()
            .enumerate()
            .map(|(i, item)| {
                to_record(item).with_context(|| format!("Invalid record at index {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::from_records(records))
    }

    /// Parse one JSON object per line, skipping blank lines
    pub fn from_lines<R: BufRead>(reader: R) -> Result<Table> {
        let mut records = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse JSON on line {}", line_num + 1))?;
            let record = to_record(&value)
                .with_context(|| format!("Invalid record on line {}", line_num + 1))?;
            records.push(record);
        }

        Ok(Table::from_records(records))
    }
}

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let is_lines = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "jsonl" | "ndjson"));

        let table = if is_lines {
            Self::from_lines(reader)?
        } else {
            Self::from_reader(reader)?
        };

        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed json"
        );
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json" | "jsonl" | "ndjson")
    }
}

fn to_record(item: &Value) -> Result<Record> {
    match item {
        Value::Object(obj) => Ok(obj
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
            .collect()),
        other => bail!("expected an object, found {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_objects_keeps_nesting() {
        let data = r#"[
            {"id": 1, "info": {"city": "Oslo"}, "tags": ["a", "b"]},
            {"id": 2, "extra": true}
        ]"#;
        let table = JsonParser::from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.columns(), &["id", "info", "tags", "extra"]);
        let first = table.row(0).unwrap();
        assert!(first.get("info").unwrap().is_map());
        assert_eq!(first.get("tags").unwrap().nested_len(), Some(2));
        assert_eq!(first.get("extra"), Some(&CellValue::Null));
    }

    #[test]
    fn test_single_object() {
        let table = JsonParser::from_reader(r#"{"a": 1}"#.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_empty_array_is_empty_table() {
        let table = JsonParser::from_reader("[]".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(JsonParser::from_reader("3".as_bytes()).is_err());
        assert!(JsonParser::from_reader("[1, 2]".as_bytes()).is_err());
    }

    #[test]
    fn test_json_lines() {
        let data = "{\"a\": 1}\n\n{\"b\": \"x\"}\n";
        let table = JsonParser::from_lines(data.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.row_count(), 2);

        let err = JsonParser::from_lines("{\"a\": 1}\nnot json\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
