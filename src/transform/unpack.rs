//! Unpacking nested map and list cells into columns

use std::borrow::Cow;

use indexmap::IndexSet;
use tracing::debug;

use crate::error::Result;
use crate::model::{check_unique, CellValue, Table};

/// Options for [`Table::unpack_dict`]
#[derive(Debug, Clone)]
pub struct UnpackDictOptions {
    /// Keys to unpack; sampled from the data when `None`
    pub keys: Option<Vec<String>>,
    /// Keep the original map column
    pub include_original: bool,
    /// Number of leading rows sampled for keys
    pub sample_size: usize,
    /// Value used when a row's map lacks a key
    pub missing: CellValue,
    /// Prefix new column names
    pub prepend: bool,
    /// Prefix to use; defaults to the unpacked column's name
    pub prepend_value: Option<String>,
}

impl Default for UnpackDictOptions {
    fn default() -> Self {
        Self {
            keys: None,
            include_original: false,
            sample_size: 1000,
            missing: CellValue::Null,
            prepend: true,
            prepend_value: None,
        }
    }
}

impl UnpackDictOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_missing(mut self, missing: impl Into<CellValue>) -> Self {
        self.missing = missing.into();
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

/// Options for [`Table::unpack_list`]
#[derive(Debug, Clone, Default)]
pub struct UnpackListOptions {
    /// Keep the original column (holding the list-coerced value)
    pub include_original: bool,
    /// Value used past the end of a shorter list
    pub missing: CellValue,
    /// Replace this table instead of returning a new one
    pub replace: bool,
    /// Upper bound on the number of generated columns
    pub max_columns: Option<usize>,
}

impl UnpackListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    pub fn with_missing(mut self, missing: impl Into<CellValue>) -> Self {
        self.missing = missing.into();
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = Some(max_columns);
        self
    }
}

/// View a cell as a sequence; non-list values become a single element
pub(crate) fn list_items(value: &CellValue) -> Cow<'_, [CellValue]> {
    match value {
        CellValue::List(items) => Cow::Borrowed(items.as_slice()),
        other => Cow::Owned(vec![other.clone()]),
    }
}

/// Longest sequence across the cells, capped at `max_columns`
pub(crate) fn list_width<'a>(
    cells: impl Iterator<Item = &'a CellValue>,
    max_columns: Option<usize>,
) -> usize {
    let widest = cells.map(|v| list_items(v).len()).max().unwrap_or(0);
    max_columns.map_or(widest, |cap| widest.min(cap))
}

/// Sorted union of map keys across the first `sample_size` cells
pub(crate) fn sample_keys<'a>(
    cells: impl Iterator<Item = &'a CellValue>,
    sample_size: usize,
) -> Vec<String> {
    let mut keys: IndexSet<&str> = IndexSet::new();
    for map in cells.take(sample_size).filter_map(CellValue::as_map) {
        keys.extend(map.keys().map(String::as_str));
    }
    let mut keys: Vec<String> = keys.into_iter().map(str::to_string).collect();
    keys.sort();
    keys
}

impl Table {
    /// Unpack a column of maps into one column per key
    ///
    /// New columns are appended after the existing ones, in sorted key order
    /// when keys are sampled. Cells that are not maps, or maps lacking a key,
    /// receive `options.missing`.
    pub fn unpack_dict(&mut self, column: &str, options: &UnpackDictOptions) -> Result<&mut Self> {
        let idx = self.require_column(column)?;

        let keys = match &options.keys {
            Some(keys) => keys.clone(),
            None => sample_keys(self.rows.iter().map(|cells| &cells[idx]), options.sample_size),
        };

        let prefix = options
            .prepend
            .then(|| options.prepend_value.clone().unwrap_or_else(|| column.to_string()));
        let new_columns = keys.iter().map(|key| match &prefix {
            Some(p) => format!("{p}_{key}"),
            None => key.clone(),
        });

        let mut header = self.columns.clone();
        if !options.include_original {
            header.remove(idx);
        }
        header.extend(new_columns);
        check_unique(&header)?;

        for cells in &mut self.rows {
            let values: Vec<CellValue> = match &cells[idx] {
                CellValue::Map(map) => keys
                    .iter()
                    .map(|key| map.get(key).cloned().unwrap_or_else(|| options.missing.clone()))
                    .collect(),
                _ => vec![options.missing.clone(); keys.len()],
            };
            if !options.include_original {
                cells.remove(idx);
            }
            cells.extend(values);
        }
        self.columns = header;

        debug!(column, keys = keys.len(), "unpacked map column");
        Ok(self)
    }

    /// Unpack a column of lists into `{column}_0 .. {column}_{N-1}`
    ///
    /// Every cell is coerced to a list first (scalars and nulls become a
    /// one-element list). `N` is the longest list, capped at
    /// `options.max_columns`. With `options.replace` this table is replaced
    /// and `None` is returned; otherwise this table is left untouched and the
    /// unpacked copy is returned.
    pub fn unpack_list(
        &mut self,
        column: &str,
        options: &UnpackListOptions,
    ) -> Result<Option<Table>> {
        let unpacked = self.unpacked_list(column, options)?;
        if options.replace {
            *self = unpacked;
            Ok(None)
        } else {
            Ok(Some(unpacked))
        }
    }

    fn unpacked_list(&self, column: &str, options: &UnpackListOptions) -> Result<Table> {
        let idx = self.require_column(column)?;
        let width = list_width(self.rows.iter().map(|cells| &cells[idx]), options.max_columns);

        let mut header = self.columns.clone();
        if !options.include_original {
            header.remove(idx);
        }
        header.extend((0..width).map(|i| format!("{column}_{i}")));
        check_unique(&header)?;

        let rows = self
            .rows
            .iter()
            .map(|cells| {
                let items = list_items(&cells[idx]);
                let mut out = cells.clone();
                if options.include_original {
                    out[idx] = CellValue::List(items.to_vec());
                } else {
                    out.remove(idx);
                }
                out.extend((0..width).map(|i| {
                    items
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| options.missing.clone())
                }));
                out
            })
            .collect();

        debug!(column, width, "unpacked list column");
        Ok(Table {
            columns: header,
            rows,
        })
    }
}
