//! Grid output for terminals

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::model::Table;

use super::OutputFormatter;

/// Aligned grid with a row count footer
pub struct TerminalOutput {
    max_cell_width: Option<usize>,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            max_cell_width: Some(40),
        }
    }

    /// Truncate cells longer than `width` characters; `None` disables it
    pub fn with_max_cell_width(width: Option<usize>) -> Self {
        Self {
            max_cell_width: width,
        }
    }

    fn cell_text(&self, text: &str) -> String {
        match self.max_cell_width {
            Some(width) if text.chars().count() > width => {
                let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
                cut.push('…');
                cut
            }
            _ => text.to_string(),
        }
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        if table.column_count() == 0 {
            writeln!(writer, "(no columns)")?;
            return Ok(());
        }

        let mut builder = Builder::default();
        builder.push_record(table.columns().iter().map(|c| self.cell_text(c)));
        for row in table.rows() {
            builder.push_record(row.values().iter().map(|v| self.cell_text(&v.display())));
        }

        let mut grid = builder.build();
        grid.with(Style::modern());
        writeln!(writer, "{grid}")?;

        let count = table.row_count();
        writeln!(writer, "({} row{})", count, if count == 1 { "" } else { "s" })?;
        Ok(())
    }
}
