//! Type introspection and string coercion

use indexmap::IndexSet;

use crate::error::{Result, TableError};
use crate::model::{CellType, CellValue, ColumnTypeStats, Table};

impl Table {
    /// Distinct runtime types observed in a column, in first-seen order
    pub fn get_column_types(&self, column: &str) -> Result<IndexSet<CellType>> {
        if self.is_empty() {
            return Err(TableError::EmptyTable("column type detection".into()));
        }
        Ok(self
            .column_values(column)?
            .map(CellValue::cell_type)
            .collect())
    }

    /// Type sets for every column
    pub fn get_columns_type_stats(&self) -> Result<Vec<ColumnTypeStats>> {
        self.columns
            .iter()
            .map(|name| Ok(ColumnTypeStats::new(name.as_str(), self.get_column_types(name)?)))
            .collect()
    }

    /// Coerce every column that is not purely strings to its string form
    ///
    /// Every value in such a column becomes a string: nulls become `""`,
    /// lists and maps their JSON text. A table with no rows is left as is.
    pub fn convert_columns_to_str(&mut self) -> Result<&mut Self> {
        if self.is_empty() {
            return Ok(self);
        }

        let targets: Vec<String> = self
            .get_columns_type_stats()?
            .into_iter()
            .filter(|stats| !stats.is_all_strings())
            .map(|stats| stats.name)
            .collect();
        let targets: Vec<&str> = targets.iter().map(String::as_str).collect();

        self.convert_column(&targets, |value| CellValue::String(value.to_text().into_owned()))
    }
}
