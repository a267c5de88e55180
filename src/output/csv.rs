//! CSV output format

use std::io::Write;

use anyhow::{Context, Result};

use crate::model::Table;

use super::OutputFormatter;

/// CSV output: nulls are empty fields, nested values are compact JSON
pub struct CsvOutput {
    delimiter: u8,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CsvOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer
            .write_record(table.columns())
            .context("Failed to write CSV header")?;
        for row in table.rows() {
            csv_writer
                .write_record(row.values().iter().map(|v| v.to_text().into_owned()))
                .context("Failed to write CSV row")?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
