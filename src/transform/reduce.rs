//! Grouping rows and reducing each group to one row

use crate::error::{Result, TableError};
use crate::model::{check_unique, CellValue, Row, Table};

impl Table {
    /// Collapse each group of rows sharing the values of `columns`
    ///
    /// Rows are sorted by `columns` first unless `presorted` is set, in which
    /// case only consecutive rows with equal keys form a group. For each group
    /// `reduce_func` receives the key values and the group's rows, and must
    /// return one value per entry in `headers`, which becomes the new schema.
    pub fn reduce_rows<F>(
        &mut self,
        columns: &[&str],
        reduce_func: F,
        headers: &[&str],
        presorted: bool,
    ) -> Result<&mut Self>
    where
        F: Fn(&[CellValue], &[Row<'_>]) -> Vec<CellValue>,
    {
        let key_indices = self.require_columns(columns)?;
        check_unique(headers)?;
        if !presorted {
            self.sort_by(columns)?;
        }

        let key_of = |cells: &[CellValue]| -> Vec<CellValue> {
            key_indices.iter().map(|&i| cells[i].clone()).collect()
        };

        let mut reduced = Vec::new();
        let mut start = 0;
        while start < self.rows.len() {
            let key = key_of(&self.rows[start]);
            let mut end = start + 1;
            while end < self.rows.len() && key_of(&self.rows[end]) == key {
                end += 1;
            }

            let group: Vec<Row<'_>> = self.rows[start..end]
                .iter()
                .map(|cells| Row::new(&self.columns, cells))
                .collect();
            let out = reduce_func(&key, &group);
            if out.len() != headers.len() {
                return Err(TableError::invalid(format!(
                    "reducer returned {} values for {} headers",
                    out.len(),
                    headers.len()
                )));
            }
            reduced.push(out);
            start = end;
        }

        self.columns = headers.iter().map(|h| h.to_string()).collect();
        self.rows = reduced;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_second(key: &[CellValue], rows: &[Row<'_>]) -> Vec<CellValue> {
        let total: i64 = rows
            .iter()
            .filter_map(|r| match r.value(1) {
                Some(CellValue::Int(i)) => Some(*i),
                _ => None,
            })
            .sum();
        vec![key[0].clone(), CellValue::Int(total)]
    }

    fn pairs(rows: &[(&str, i64)]) -> Table {
        Table::from_rows(
            ["k", "v"],
            rows.iter().map(|(k, v)| vec![CellValue::from(*k), CellValue::Int(*v)]),
        )
        .unwrap()
    }

    fn values(table: &Table) -> Vec<Vec<CellValue>> {
        table.rows().map(|r| r.values().to_vec()).collect()
    }

    #[test]
    fn test_presorted_groups_consecutive_rows() {
        let mut table = pairs(&[("x", 1), ("x", 2), ("y", 3)]);
        table.reduce_rows(&["k"], sum_second, &["k", "total"], true).unwrap();

        assert_eq!(table.columns(), &["k", "total"]);
        assert_eq!(
            values(&table),
            vec![
                vec![CellValue::from("x"), CellValue::Int(3)],
                vec![CellValue::from("y"), CellValue::Int(3)],
            ]
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let mut table = pairs(&[("y", 3), ("x", 1), ("y", 4), ("x", 2)]);
        table.reduce_rows(&["k"], sum_second, &["k", "total"], false).unwrap();

        assert_eq!(
            values(&table),
            vec![
                vec![CellValue::from("x"), CellValue::Int(3)],
                vec![CellValue::from("y"), CellValue::Int(7)],
            ]
        );
        table.assert_schema_total();
    }

    #[test]
    fn test_presorted_does_not_merge_split_groups() {
        let mut table = pairs(&[("x", 1), ("y", 2), ("x", 3)]);
        table.reduce_rows(&["k"], sum_second, &["k", "total"], true).unwrap();
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_wrong_reducer_width_fails() {
        let mut table = pairs(&[("x", 1)]);
        let err = table
            .reduce_rows(&["k"], |key, _rows| key.to_vec(), &["k", "total"], true)
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_key_column_fails() {
        let mut table = pairs(&[("x", 1)]);
        let err = table
            .reduce_rows(&["nope"], sum_second, &["k"], true)
            .unwrap_err();
        assert_eq!(err, TableError::UnknownColumn("nope".into()));
    }
}
