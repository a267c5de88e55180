//! Output formatting for tables

mod csv;
mod json;
mod terminal;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::model::{ColumnTypeStats, Table};

pub use self::csv::CsvOutput;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
///
/// Rendering only reads the table, so one table may be rendered any number
/// of times.
pub trait OutputFormatter {
    /// Render a table to a writer
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, pretty: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Table => Box::new(TerminalOutput::new()),
            OutputFormat::Csv => Box::new(CsvOutput::new()),
            OutputFormat::Json if pretty => Box::new(JsonOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::compact()),
            OutputFormat::Jsonl => Box::new(JsonOutput::lines()),
        }
    }
}

/// Render a table to `path`, or to stdout when no path is given
pub fn render_table(
    table: &Table,
    format: OutputFormat,
    pretty: bool,
    path: Option<&Path>,
) -> Result<()> {
    let formatter = OutputFactory::create(format, pretty);
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            formatter.render(table, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            formatter.render(table, &mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Write one `name: type [observed, ...]` line per column
pub fn render_type_stats(stats: &[ColumnTypeStats], writer: &mut dyn Write) -> Result<()> {
    for column in stats {
        writeln!(writer, "{column}")?;
    }
    Ok(())
}
