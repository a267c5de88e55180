//! Appending rows from other tables

use indexmap::IndexSet;

use crate::model::{CellValue, Table};

impl Table {
    /// Append rows from other tables by position
    ///
    /// No field alignment happens: each incoming row is truncated or padded
    /// with `missing` to this table's width. Only use it for tables known to
    /// share this table's column order; mismatched schemas silently land in
    /// the wrong columns.
    pub fn stack(&mut self, tables: &[&Table], missing: impl Into<CellValue>) -> &mut Self {
        let missing = missing.into();
        let width = self.columns.len();

        for table in tables {
            for cells in &table.rows {
                let mut out: Vec<CellValue> = cells.iter().take(width).cloned().collect();
                out.resize(width, missing.clone());
                self.rows.push(out);
            }
        }

        self
    }

    /// Append rows from other tables, aligning columns by name
    ///
    /// The schema becomes the union of all column names, in first-seen order
    /// across this table and then `tables`. Cells a table has no column for
    /// are set to `missing`.
    pub fn concat(&mut self, tables: &[&Table], missing: impl Into<CellValue>) -> &mut Self {
        let missing = missing.into();

        let mut header: IndexSet<String> = self.columns.iter().cloned().collect();
        for table in tables {
            header.extend(table.columns.iter().cloned());
        }

        let width = header.len();
        for cells in &mut self.rows {
            cells.resize(width, missing.clone());
        }

        for table in tables {
            let mapping: Vec<Option<usize>> = header
                .iter()
                .map(|name| table.column_index(name))
                .collect();
            for cells in &table.rows {
                let out = mapping
                    .iter()
                    .map(|idx| match idx {
                        Some(i) => cells[*i].clone(),
                        None => missing.clone(),
                    })
                    .collect();
                self.rows.push(out);
            }
        }

        self.columns = header.into_iter().collect();
        self
    }
}
