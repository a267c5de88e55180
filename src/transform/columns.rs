//! Schema mutation: add, remove, rename, move, fill and coalesce columns

use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{CellValue, Row, Table};

/// Value written into every cell of a new or refilled column
///
/// Either a constant, or a function evaluated once per row against that
/// row's current data.
pub enum ColumnFill {
    Value(CellValue),
    Func(Box<dyn Fn(&Row<'_>) -> CellValue>),
}

impl ColumnFill {
    pub fn value(value: impl Into<CellValue>) -> Self {
        ColumnFill::Value(value.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Row<'_>) -> CellValue + 'static,
    {
        ColumnFill::Func(Box::new(f))
    }

    fn apply(&self, row: &Row<'_>) -> CellValue {
        match self {
            ColumnFill::Value(v) => v.clone(),
            ColumnFill::Func(f) => f(row),
        }
    }
}

impl std::fmt::Debug for ColumnFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnFill::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ColumnFill::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<CellValue> for ColumnFill {
    fn from(value: CellValue) -> Self {
        ColumnFill::Value(value)
    }
}

impl From<&str> for ColumnFill {
    fn from(value: &str) -> Self {
        ColumnFill::Value(value.into())
    }
}

impl From<String> for ColumnFill {
    fn from(value: String) -> Self {
        ColumnFill::Value(value.into())
    }
}

impl From<i64> for ColumnFill {
    fn from(value: i64) -> Self {
        ColumnFill::Value(value.into())
    }
}

impl From<f64> for ColumnFill {
    fn from(value: f64) -> Self {
        ColumnFill::Value(value.into())
    }
}

impl From<bool> for ColumnFill {
    fn from(value: bool) -> Self {
        ColumnFill::Value(value.into())
    }
}

impl Table {
    /// Add a column, filled with a constant or a per-row function
    ///
    /// The column is inserted at `index` (clamped to the column count), or
    /// appended when no index is given.
    pub fn add_column(
        &mut self,
        name: &str,
        fill: impl Into<ColumnFill>,
        index: Option<usize>,
    ) -> Result<&mut Self> {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }

        let fill = fill.into();
        let values: Vec<CellValue> = self.rows().map(|row| fill.apply(&row)).collect();

        let idx = index.unwrap_or(self.columns.len()).min(self.columns.len());
        self.columns.insert(idx, name.to_string());
        for (cells, value) in self.rows.iter_mut().zip(values) {
            cells.insert(idx, value);
        }

        Ok(self)
    }

    /// Remove one or more columns
    ///
    /// Every name must exist; nothing is removed when one does not.
    pub fn remove_column(&mut self, names: &[&str]) -> Result<&mut Self> {
        let mut indices = self.require_columns(names)?;
        indices.sort_unstable();
        indices.dedup();

        for &idx in indices.iter().rev() {
            self.columns.remove(idx);
            for cells in &mut self.rows {
                cells.remove(idx);
            }
        }

        Ok(self)
    }

    /// Rename a column in place
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        let idx = self.require_column(old)?;
        if old == new {
            return Ok(self);
        }
        if self.has_column(new) {
            return Err(TableError::DuplicateColumn(new.to_string()));
        }
        self.columns[idx] = new.to_string();
        Ok(self)
    }

    /// Move a column to a new position without touching its values
    ///
    /// Indexes past the end move the column to the last position.
    pub fn move_column(&mut self, name: &str, index: usize) -> Result<&mut Self> {
        let from = self.require_column(name)?;
        let column = self.columns.remove(from);
        let to = index.min(self.columns.len());
        self.columns.insert(to, column);

        for cells in &mut self.rows {
            let value = cells.remove(from);
            cells.insert(to, value);
        }

        Ok(self)
    }

    /// Replace every value of a column
    ///
    /// The new values are computed against the original row, then the column
    /// is re-created under its old name. It ends up in the last position.
    pub fn fill_column(&mut self, name: &str, fill: impl Into<ColumnFill>) -> Result<&mut Self> {
        self.require_column(name)?;

        let temp = format!("{name}_column_fill_temp");
        self.add_column(&temp, fill, None)?;
        self.remove_column(&[name])?;
        self.rename_column(&temp, name)
    }

    /// Replace empty values of a column with `fill_value`
    pub fn fillna_column(
        &mut self,
        name: &str,
        fill_value: impl Into<CellValue>,
    ) -> Result<&mut Self> {
        let column = name.to_string();
        let fill_value = fill_value.into();
        self.fill_column(
            name,
            ColumnFill::func(move |row| match row.get(&column) {
                Some(value) if value.is_truthy() => value.clone(),
                _ => fill_value.clone(),
            }),
        )
    }

    /// Apply a value-level conversion to every cell of the given columns
    pub fn convert_column<F>(&mut self, names: &[&str], f: F) -> Result<&mut Self>
    where
        F: Fn(&CellValue) -> CellValue,
    {
        let indices = self.require_columns(names)?;
        for cells in &mut self.rows {
            for &idx in &indices {
                cells[idx] = f(&cells[idx]);
            }
        }
        Ok(self)
    }

    /// Apply a value-level conversion to every cell of the table
    pub fn convert_table<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(&CellValue) -> CellValue,
    {
        for cells in &mut self.rows {
            for cell in cells.iter_mut() {
                *cell = f(cell);
            }
        }
        Ok(self)
    }

    /// Coalesce several columns into `dest`
    ///
    /// Each row takes the first non-empty value among `sources`, left to
    /// right. When `dest` already exists and is not itself listed as a source,
    /// its own value is the last fallback. An existing `dest` is overwritten
    /// in place, otherwise it is appended.
    pub fn coalesce_columns(
        &mut self,
        dest: &str,
        sources: &[&str],
        remove_sources: bool,
    ) -> Result<&mut Self> {
        let source_indices = self.require_columns(sources)?;
        let dest_idx = self.column_index(dest);

        let mut candidates = source_indices;
        if let Some(idx) = dest_idx {
            if !candidates.contains(&idx) {
                candidates.push(idx);
            }
        }

        let values: Vec<CellValue> = self
            .rows
            .iter()
            .map(|cells| {
                candidates
                    .iter()
                    .map(|&i| &cells[i])
                    .find(|v| v.is_truthy())
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        match dest_idx {
            Some(idx) => {
                debug!(?sources, dest, "coalescing into existing column");
                for (cells, value) in self.rows.iter_mut().zip(values) {
                    cells[idx] = value;
                }
            }
            None => {
                debug!(?sources, dest, "creating coalesced column");
                self.columns.push(dest.to_string());
                for (cells, value) in self.rows.iter_mut().zip(values) {
                    cells.push(value);
                }
            }
        }

        if remove_sources {
            let drop: Vec<&str> = sources.iter().copied().filter(|s| *s != dest).collect();
            self.remove_column(&drop)?;
        }

        Ok(self)
    }
}
