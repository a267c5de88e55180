//! Wide to long pivots: `melt` and `long_table`

use indexmap::IndexMap;

use crate::error::Result;
use crate::model::{check_unique, CellValue, Table};

use super::unpack::{UnpackDictOptions, UnpackListOptions};

/// Options for [`Table::long_table`]
#[derive(Debug, Clone)]
pub struct LongTableOptions {
    /// Renames applied to key columns in the output (old name to new name)
    pub key_rename: IndexMap<String, String>,
    /// Keep the pivoted column in the source table
    pub retain_original: bool,
    /// Prefix columns when list elements are maps and get unpacked
    pub prepend: bool,
    /// Prefix to use; defaults to the pivoted column's name
    pub prepend_value: Option<String>,
}

impl Default for LongTableOptions {
    fn default() -> Self {
        Self {
            key_rename: IndexMap::new(),
            retain_original: false,
            prepend: true,
            prepend_value: None,
        }
    }
}

impl LongTableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_rename(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.key_rename.insert(old.into(), new.into());
        self
    }

    pub fn with_retain_original(mut self, retain: bool) -> Self {
        self.retain_original = retain;
        self
    }

    pub fn with_prepend(mut self, prepend: bool) -> Self {
        self.prepend = prepend;
        self
    }

    pub fn with_prepend_value(mut self, prefix: impl Into<String>) -> Self {
        self.prepend_value = Some(prefix.into());
        self
    }
}

impl Table {
    /// Pivot every non-key column into `variable`/`value` rows
    ///
    /// Output rows are emitted row by row, then column by column, so the
    /// input order is preserved.
    pub fn melt(&self, key: &[&str]) -> Result<Table> {
        let key_indices = self.require_columns(key)?;
        let variables: Vec<usize> = (0..self.columns.len())
            .filter(|i| !key_indices.contains(i))
            .collect();

        let mut columns: Vec<String> = key.iter().map(|k| k.to_string()).collect();
        columns.push("variable".to_string());
        columns.push("value".to_string());
        check_unique(&columns)?;

        let mut rows = Vec::with_capacity(self.rows.len() * variables.len());
        for cells in &self.rows {
            for &var in &variables {
                let mut out: Vec<CellValue> =
                    key_indices.iter().map(|&i| cells[i].clone()).collect();
                out.push(CellValue::String(self.columns[var].clone()));
                out.push(cells[var].clone());
                rows.push(out);
            }
        }

        Ok(Table { columns, rows })
    }

    /// Unpivot a list column into one row per `(key, element)` pair
    ///
    /// Null elements are dropped. When the first surviving element is a map,
    /// the elements are unpacked into columns. Unless
    /// `options.retain_original` is set, `column` is removed from this table.
    pub fn long_table(
        &mut self,
        key: &[&str],
        column: &str,
        options: &LongTableOptions,
    ) -> Result<Table> {
        let mut selected: Vec<&str> = key.to_vec();
        selected.push(column);

        let mut wide = self.cut(&selected)?;
        wide.unpack_list(column, &UnpackListOptions::new().with_replace(true))?;

        let mut kept: Vec<&str> = key.to_vec();
        kept.push("value");
        let mut long = wide.melt(key)?.cut(&kept)?;
        long.rename_column("value", column)?
            .remove_null_rows(&[column])?;

        for (old, new) in &options.key_rename {
            long.rename_column(old, new)?;
        }

        let first_is_map = long
            .column_values(column)?
            .next()
            .is_some_and(CellValue::is_map);
        if first_is_map {
            let mut dict_options = UnpackDictOptions::new().with_prepend(options.prepend);
            dict_options.prepend_value = options.prepend_value.clone();
            long.unpack_dict(column, &dict_options)?;
        }

        if !options.retain_original {
            self.remove_column(&[column])?;
        }

        Ok(long)
    }
}
