//! Column projection, row filtering and chunking

use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{check_unique, Row, Table};

use super::expr::Expr;

/// A row predicate for [`Table::select_rows`]
pub enum RowFilter {
    Func(Box<dyn Fn(&Row<'_>) -> bool>),
    Expr(Expr),
}

impl RowFilter {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Row<'_>) -> bool + 'static,
    {
        RowFilter::Func(Box::new(f))
    }

    /// Parse a filter expression such as `{age} >= 18`
    pub fn expr(source: &str) -> Result<Self> {
        Ok(RowFilter::Expr(Expr::parse(source)?))
    }

    pub fn matches(&self, row: &Row<'_>) -> Result<bool> {
        match self {
            RowFilter::Func(f) => Ok(f(row)),
            RowFilter::Expr(expr) => expr.evaluate(row),
        }
    }
}

impl std::fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowFilter::Func(_) => f.write_str("RowFilter::Func(..)"),
            RowFilter::Expr(expr) => f.debug_tuple("RowFilter::Expr").field(expr).finish(),
        }
    }
}

impl From<Expr> for RowFilter {
    fn from(expr: Expr) -> Self {
        RowFilter::Expr(expr)
    }
}

impl Table {
    /// New table with only `columns`, in the order given
    pub fn cut(&self, columns: &[&str]) -> Result<Table> {
        check_unique(columns)?;
        let indices = self.require_columns(columns)?;

        Ok(Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|cells| indices.iter().map(|&i| cells[i].clone()).collect())
                .collect(),
        })
    }

    /// New table with the rows satisfying every filter
    pub fn select_rows(&self, filters: &[RowFilter]) -> Result<Table> {
        let mut rows = Vec::new();
        for cells in &self.rows {
            let row = Row::new(&self.columns, cells);
            let mut keep = true;
            for filter in filters {
                if !filter.matches(&row)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                rows.push(cells.clone());
            }
        }

        debug!(kept = rows.len(), total = self.rows.len(), "selected rows");
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Drop rows that are null in any of `columns`
    pub fn remove_null_rows(&mut self, columns: &[&str]) -> Result<&mut Self> {
        let indices = self.require_columns(columns)?;
        let before = self.rows.len();
        self.rows
            .retain(|cells| indices.iter().all(|&i| !cells[i].is_null()));
        debug!(removed = before - self.rows.len(), ?columns, "removed null rows");
        Ok(self)
    }

    /// Split into tables of at most `rows` rows each
    pub fn chunk(&self, rows: usize) -> Result<Vec<Table>> {
        if rows == 0 {
            return Err(TableError::invalid("chunk size must be at least 1"));
        }

        Ok(self
            .rows
            .chunks(rows)
            .map(|chunk| Table {
                columns: self.columns.clone(),
                rows: chunk.to_vec(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn numbered(n: i64) -> Table {
        Table::from_rows(
            ["n", "even", "label"],
            (0..n).map(|i| {
                vec![
                    CellValue::Int(i),
                    CellValue::Bool(i % 2 == 0),
                    if i == 3 { CellValue::Null } else { CellValue::from(format!("row{i}")) },
                ]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_cut_reorders_and_is_idempotent() {
        let table = numbered(3);
        let once = table.cut(&["label", "n"]).unwrap();
        assert_eq!(once.columns(), &["label", "n"]);
        assert_eq!(once.row(1).unwrap().values(), &[CellValue::from("row1"), CellValue::Int(1)]);

        let twice = once.cut(&["label", "n"]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cut_errors() {
        let table = numbered(1);
        assert_eq!(table.cut(&["nope"]).unwrap_err(), TableError::UnknownColumn("nope".into()));
        assert!(matches!(
            table.cut(&["n", "n"]).unwrap_err(),
            TableError::DuplicateColumn(_)
        ));
    }

    #[test]
    fn test_select_rows_ands_filters() {
        let table = numbered(6);
        let filters = vec![
            RowFilter::expr("{even}").unwrap(),
            RowFilter::func(|row| matches!(row.get("n"), Some(CellValue::Int(n)) if *n > 0)),
        ];
        let selected = table.select_rows(&filters).unwrap();

        let ns: Vec<&CellValue> = selected.column_values("n").unwrap().collect();
        assert_eq!(ns, vec![&CellValue::Int(2), &CellValue::Int(4)]);
        assert_eq!(table.row_count(), 6);
    }

    #[test]
    fn test_select_rows_without_filters_keeps_everything() {
        let table = numbered(4);
        assert_eq!(table.select_rows(&[]).unwrap(), table);
    }

    #[test]
    fn test_remove_null_rows() {
        let mut table = numbered(5);
        table.remove_null_rows(&["label"]).unwrap();
        assert_eq!(table.row_count(), 4);
        assert!(table.column_values("label").unwrap().all(|v| !v.is_null()));
        table.assert_schema_total();
    }

    #[test]
    fn test_chunk_short_last_chunk() {
        let table = numbered(5);
        let chunks = table.chunk(2).unwrap();

        let sizes: Vec<usize> = chunks.iter().map(Table::row_count).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(chunks.iter().all(|c| c.columns() == table.columns()));
        assert_eq!(chunks[2].row(0).unwrap().get("n"), Some(&CellValue::Int(4)));
    }

    #[test]
    fn test_chunk_zero_is_invalid() {
        assert!(matches!(
            numbered(2).chunk(0).unwrap_err(),
            TableError::InvalidArgument(_)
        ));
    }
}
