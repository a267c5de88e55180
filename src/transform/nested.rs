//! Expanding nested list and map cells into their own rows

use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{check_unique, CellValue, RowHasher, Table};

use super::columns::ColumnFill;
use super::unpack::{list_items, list_width, sample_keys, UnpackDictOptions};

/// Whether unpacked rows carry every original column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandOriginal {
    /// Output only the key, the sub-key and the value
    #[default]
    No,
    /// Carry every original column and keep non-nested rows
    Yes,
    /// Like `Yes`, unless some nested value has more elements than this
    UpTo(usize),
}

impl FromStr for ExpandOriginal {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "no" | "false" | "none" => Ok(ExpandOriginal::No),
            "yes" | "true" | "all" => Ok(ExpandOriginal::Yes),
            other => other
                .parse::<usize>()
                .map(ExpandOriginal::UpTo)
                .map_err(|_| TableError::invalid(format!("invalid expand_original value {s:?}"))),
        }
    }
}

impl Table {
    /// Turn every nested list element or map entry in `column` into a row
    ///
    /// Each output row holds the retained columns, `column` (set to the list
    /// index or map key) and `value`. Null sub-values are dropped. Cells that
    /// are neither lists nor maps are never unpacked.
    ///
    /// Without expansion the result holds `uid`, `key`, `column` and `value`,
    /// and `column` is removed from this table. With expansion the result
    /// carries every column: rows whose cell was not nested are kept as they
    /// were, `value` is renamed to `{column}_value`, and `column` moves to the
    /// last position. This table is left untouched in that case.
    ///
    /// `uid` is a content hash of each output row, placed first. When
    /// expanding a table that already has a `uid` column, that column is
    /// kept instead.
    pub fn unpack_nested_columns_as_rows(
        &mut self,
        column: &str,
        key: &str,
        expand_original: ExpandOriginal,
    ) -> Result<Table> {
        let col_idx = self.require_column(column)?;

        let expand = match expand_original {
            ExpandOriginal::No => false,
            ExpandOriginal::Yes => true,
            ExpandOriginal::UpTo(threshold) => {
                // no nested values at all is within any threshold
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|cells| cells[col_idx].nested_len())
                    .max()
                    .unwrap_or(0);
                if widest > threshold {
                    debug!(
                        column,
                        widest, threshold, "nested values too wide, not expanding originals"
                    );
                }
                widest <= threshold
            }
        };

        let retained: Vec<usize> = if expand {
            (0..self.columns.len()).filter(|&i| i != col_idx).collect()
        } else {
            if key == column {
                return Err(TableError::invalid(format!(
                    "key and unpacked column are both {column:?}"
                )));
            }
            vec![self.require_column(key)?]
        };

        let mut long_columns: Vec<String> =
            retained.iter().map(|&i| self.columns[i].clone()).collect();
        long_columns.push(column.to_string());
        long_columns.push("value".to_string());
        check_unique(&long_columns)?;

        let long_row = |cells: &[CellValue], variable: String, value: &CellValue| {
            let mut out: Vec<CellValue> = retained.iter().map(|&i| cells[i].clone()).collect();
            out.push(CellValue::String(variable));
            out.push(value.clone());
            out
        };

        // Lists: one row per index below the widest list
        let list_rows: Vec<&Vec<CellValue>> = self
            .rows
            .iter()
            .filter(|cells| cells[col_idx].is_list())
            .collect();
        let width = list_width(list_rows.iter().map(|cells| &cells[col_idx]), None);
        let mut from_lists = Table::new(long_columns.clone())?;
        for cells in &list_rows {
            let items = list_items(&cells[col_idx]);
            for (i, item) in items.iter().take(width).enumerate() {
                if !item.is_null() {
                    from_lists.rows.push(long_row(cells.as_slice(), i.to_string(), item));
                }
            }
        }

        // Maps: one row per sampled key
        let map_rows: Vec<&Vec<CellValue>> = self
            .rows
            .iter()
            .filter(|cells| cells[col_idx].is_map())
            .collect();
        let keys = sample_keys(
            map_rows.iter().map(|cells| &cells[col_idx]),
            UnpackDictOptions::default().sample_size,
        );
        let mut from_maps = Table::new(long_columns)?;
        for cells in &map_rows {
            let Some(map) = cells[col_idx].as_map() else {
                continue;
            };
            for k in &keys {
                match map.get(k) {
                    Some(value) if !value.is_null() => {
                        from_maps.rows.push(long_row(cells.as_slice(), k.clone(), value));
                    }
                    _ => {}
                }
            }
        }

        let mut long = from_lists;
        long.concat(&[&from_maps], CellValue::Null);
        debug!(
            column,
            expand,
            rows = long.row_count(),
            "unpacked nested values as rows"
        );

        let hasher = RowHasher::new();
        if expand {
            let originals: Vec<Vec<CellValue>> = self
                .rows
                .iter()
                .filter(|cells| !cells[col_idx].is_list() && !cells[col_idx].is_map())
                .cloned()
                .collect();
            let mut output = Table {
                columns: self.columns.clone(),
                rows: originals,
            };
            output.concat(&[&long], CellValue::Null);

            if !self.has_column("uid") {
                let uid = ColumnFill::func(move |row| hasher.hash_row(row).into());
                output.add_column("uid", uid, Some(0))?;
            }
            output.rename_column("value", &format!("{column}_value"))?;
            let last = output.column_count() - 1;
            output.move_column(column, last)?;
            Ok(output)
        } else {
            self.remove_column(&[column])?;
            let uid = ColumnFill::func(move |row| hasher.hash_row(row).into());
            long.add_column("uid", uid, Some(0))?;
            Ok(long)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts() -> Table {
        Table::from_rows(
            ["id", "name", "info"],
            vec![
                vec![1.into(), "ann".into(), CellValue::from(vec!["a", "b"])],
                vec![
                    2.into(),
                    "bob".into(),
                    CellValue::map([("city", CellValue::from("Oslo")), ("zip", CellValue::Null)]),
                ],
                vec![3.into(), "cy".into(), "scalar".into()],
                vec![4.into(), "di".into(), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_key_only_output() {
        let mut table = contacts();
        let long = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::No)
            .unwrap();

        assert_eq!(long.columns(), &["uid", "id", "info", "value"]);
        let rows: Vec<Vec<CellValue>> = long
            .rows()
            .map(|r| r.values()[1..].to_vec())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec![CellValue::Int(1), CellValue::from("0"), CellValue::from("a")],
                vec![CellValue::Int(1), CellValue::from("1"), CellValue::from("b")],
                vec![CellValue::Int(2), CellValue::from("city"), CellValue::from("Oslo")],
            ]
        );
        assert_eq!(table.columns(), &["id", "name"]);
    }

    #[test]
    fn test_uid_is_deterministic() {
        let first = contacts()
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::No)
            .unwrap();
        let second = contacts()
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::No)
            .unwrap();
        assert_eq!(first, second);

        let uids: Vec<_> = first.column_values("uid").unwrap().collect();
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn test_expand_original_keeps_all_columns() {
        let mut table = contacts();
        let before = table.clone();
        let output = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::Yes)
            .unwrap();

        assert_eq!(output.columns(), &["uid", "id", "name", "info_value", "info"]);
        // scalar and null rows first, then unpacked list then map rows
        assert_eq!(output.row_count(), 5);
        let first = output.row(0).unwrap();
        assert_eq!(first.get("info"), Some(&CellValue::from("scalar")));
        assert_eq!(first.get("info_value"), Some(&CellValue::Null));
        let last = output.row(4).unwrap();
        assert_eq!(last.get("name"), Some(&CellValue::from("bob")));
        assert_eq!(last.get("info"), Some(&CellValue::from("city")));
        assert_eq!(last.get("info_value"), Some(&CellValue::from("Oslo")));
        assert_eq!(table, before);
        output.assert_schema_total();
    }

    #[test]
    fn test_expand_threshold_is_global_maximum() {
        let mut table = Table::from_rows(
            ["id", "info"],
            vec![
                vec![1.into(), CellValue::from(vec![1i64])],
                vec![2.into(), CellValue::from(vec![1i64, 2, 3, 4, 5])],
            ],
        )
        .unwrap();

        let output = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::UpTo(2))
            .unwrap();

        assert_eq!(output.columns(), &["uid", "id", "info", "value"]);
        assert_eq!(output.row_count(), 6);
        assert_eq!(table.columns(), &["id"]);
    }

    #[test]
    fn test_expand_threshold_within_limit_expands() {
        let mut table = contacts();
        let output = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::UpTo(2))
            .unwrap();
        assert!(output.has_column("info_value"));
    }

    #[test]
    fn test_expand_threshold_without_nested_values_expands() {
        let mut table = Table::from_rows(
            ["id", "info"],
            vec![vec![1.into(), "x".into()], vec![2.into(), CellValue::Null]],
        )
        .unwrap();
        let before = table.clone();
        let output = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::UpTo(3))
            .unwrap();

        assert_eq!(output.columns(), &["uid", "id", "info_value", "info"]);
        assert_eq!(output.row_count(), 2);
        let first = output.row(0).unwrap();
        assert_eq!(first.get("id"), Some(&CellValue::Int(1)));
        assert_eq!(first.get("info"), Some(&CellValue::from("x")));
        assert_eq!(first.get("info_value"), Some(&CellValue::Null));
        assert_eq!(table, before);
        output.assert_schema_total();
    }

    #[test]
    fn test_expand_keeps_existing_uid() {
        let mut table = Table::from_rows(
            ["uid", "id", "info"],
            vec![
                vec!["u1".into(), 1.into(), CellValue::from(vec!["a", "b"])],
                vec!["u2".into(), 2.into(), "plain".into()],
            ],
        )
        .unwrap();
        let output = table
            .unpack_nested_columns_as_rows("info", "id", ExpandOriginal::Yes)
            .unwrap();

        assert_eq!(output.columns(), &["uid", "id", "info_value", "info"]);
        let uids: Vec<&CellValue> = output.column_values("uid").unwrap().collect();
        assert_eq!(
            uids,
            vec![&CellValue::from("u2"), &CellValue::from("u1"), &CellValue::from("u1")]
        );
        output.assert_schema_total();
    }

    #[test]
    fn test_expand_original_parse() {
        assert_eq!("all".parse::<ExpandOriginal>().unwrap(), ExpandOriginal::Yes);
        assert_eq!("false".parse::<ExpandOriginal>().unwrap(), ExpandOriginal::No);
        assert_eq!("10".parse::<ExpandOriginal>().unwrap(), ExpandOriginal::UpTo(10));
        assert!("sometimes".parse::<ExpandOriginal>().is_err());
    }
}
