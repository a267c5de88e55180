//! Table and Row data structures

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, TableError};

use super::value::CellValue;

/// A record handed to or from external collaborators
pub type Record = IndexMap<String, CellValue>;

/// Borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> Row<'a> {
    pub(crate) fn new(columns: &'a [String], cells: &'a [CellValue]) -> Self {
        Self { columns, cells }
    }

    /// Get a cell value by column name
    pub fn get(&self, name: &str) -> Option<&'a CellValue> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.cells.get(idx)
    }

    /// Get a cell value by column index
    pub fn value(&self, index: usize) -> Option<&'a CellValue> {
        self.cells.get(index)
    }

    /// Cell values in column order
    pub fn values(&self) -> &'a [CellValue] {
        self.cells
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    /// Iterate over `(column, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    /// Copy the row out as an owned record
    pub fn to_record(&self) -> Record {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// A mutable table of named columns and rows
///
/// Every row holds exactly one cell per column. Operations that reshape the
/// schema keep that invariant; operations that produce an independent result
/// (`cut`, `select_rows`, `long_table`, `chunk`, ...) return a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a new empty table with column names
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_unique(&columns)?;
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a table from an explicit header and data rows
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<CellValue>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Build a table from semi-structured records
    ///
    /// The schema is the union of record keys in first-seen order; a record
    /// lacking a key gets `Null` in that column.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records: Vec<Record> = records.into_iter().collect();

        let mut column_names: IndexSet<String> = IndexSet::new();
        for record in &records {
            for key in record.keys() {
                if !column_names.contains(key) {
                    column_names.insert(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                column_names
                    .iter()
                    .map(|name| record.swap_remove(name).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            columns: column_names.into_iter().collect(),
            rows,
        }
    }

    /// Add a row to the table
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(TableError::invalid(format!(
                "row has {} values but the table has {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column names, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over rows; each call starts a fresh pass
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row::new(&self.columns, cells))
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row::new(&self.columns, cells))
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |cells| &cells[idx]))
    }

    /// Copy every row out as an owned record
    pub fn to_records(&self) -> Vec<Record> {
        self.rows().map(|row| row.to_record()).collect()
    }

    /// Sort rows by one or more columns (stable)
    pub fn sort_by(&mut self, columns: &[&str]) -> Result<&mut Self> {
        let indices = self.require_columns(columns)?;
        self.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| a[i].sort_cmp(&b[i]))
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(self)
    }

    /// Resolve a column name, failing when it is absent
    pub(crate) fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub(crate) fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.require_column(name)).collect()
    }
}

#[cfg(test)]
impl Table {
    /// Every row holds exactly one cell per column, and names are unique
    pub(crate) fn assert_schema_total(&self) {
        assert!(check_unique(&self.columns).is_ok(), "duplicate columns {:?}", self.columns);
        for row in self.rows() {
            assert_eq!(row.values().len(), self.column_count());
        }
    }
}

/// Fail on the first repeated name
pub(crate) fn check_unique<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen: IndexSet<&str> = IndexSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(TableError::DuplicateColumn(name.as_ref().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_from_records_pads_missing_keys() {
        let table = Table::from_records(vec![
            record(&[("a", 1.into()), ("b", "x".into())]),
            record(&[("b", "y".into()), ("c", true.into())]),
        ]);

        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.row_count(), 2);
        let second = table.row(1).unwrap();
        assert_eq!(second.get("a"), Some(&CellValue::Null));
        assert_eq!(second.get("c"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = Table::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut table = Table::new(["a", "b"]).unwrap();
        assert!(table.push_row(vec![1.into()]).is_err());
        assert!(table.push_row(vec![1.into(), 2.into()]).is_ok());
    }

    #[test]
    fn test_rows_iteration_is_restartable() {
        let table = Table::from_rows(["a"], vec![vec![1.into()], vec![2.into()]]).unwrap();
        let first: Vec<_> = table.rows().map(|r| r.values().to_vec()).collect();
        let second: Vec<_> = table.rows().map(|r| r.values().to_vec()).collect();
        assert_eq!(first, second);
        assert_eq!(table.to_records()[1]["a"], CellValue::Int(2));
    }

    #[test]
    fn test_sort_by_is_stable() {
        let mut table = Table::from_rows(
            ["k", "v"],
            vec![
                vec!["b".into(), 1.into()],
                vec!["a".into(), 2.into()],
                vec!["b".into(), 3.into()],
                vec!["a".into(), 4.into()],
            ],
        )
        .unwrap();

        table.sort_by(&["k"]).unwrap();
        let values: Vec<CellValue> = table.column_values("v").unwrap().cloned().collect();
        let expected: Vec<CellValue> = vec![2.into(), 4.into(), 1.into(), 3.into()];
        assert_eq!(values, expected);
    }
}
