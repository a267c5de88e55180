//! CSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::model::{CellValue, Table};

use super::Parser;

/// Parser for CSV files
pub struct CsvParser;

impl CsvParser {
    /// Read a header line and rows from any reader
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let mut table = Table::new(headers.iter()).context("Invalid CSV header")?;
        let width = table.column_count();

        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let record =
                result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?;

            // Short rows are padded with nulls, long rows truncated
            let mut cells: Vec<CellValue> =
                record.iter().take(width).map(parse_cell_value).collect();
            cells.resize(width, CellValue::Null);

            table.push_row(cells)?;
        }

        Ok(table)
    }
}

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => config.delimiter,
        };

        let table = Self::from_reader(BufReader::new(file), delimiter)?;
        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed csv"
        );
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference
pub fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("no") {
        return CellValue::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Embedded JSON arrays and objects become nested values
    if (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'))
    {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return CellValue::from_json(&value);
        }
    }

    CellValue::String(trimmed.to_string())
}
