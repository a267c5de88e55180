//! Ordered transformation steps applied to a table

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{CellValue, Table};
use crate::transform::{
    ExpandOriginal, Expr, LongTableOptions, MatchColumnsOptions, RowFilter, UnpackDictOptions,
    UnpackListOptions,
};

/// One transformation in a pipeline
///
/// Steps that produce a new table (`UnpackNested`, `LongTable`, `Select`,
/// `Cut`, and `UnpackList` without `replace`) hand that table to the next
/// step.
#[derive(Debug, Clone)]
pub enum Step {
    SortBy(Vec<String>),
    UnpackDict {
        column: String,
        options: UnpackDictOptions,
    },
    UnpackList {
        column: String,
        options: UnpackListOptions,
    },
    Coalesce {
        dest: String,
        sources: Vec<String>,
        remove_sources: bool,
    },
    FillNa {
        column: String,
        value: CellValue,
    },
    UnpackNested {
        column: String,
        key: String,
        expand_original: ExpandOriginal,
    },
    LongTable {
        key: Vec<String>,
        column: String,
        options: LongTableOptions,
    },
    Select(Expr),
    MatchColumns {
        desired: Vec<String>,
        options: MatchColumnsOptions,
    },
    Cut(Vec<String>),
    RemoveNullRows(Vec<String>),
    ConvertToStr,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::SortBy(_) => "sort_by",
            Step::UnpackDict { .. } => "unpack_dict",
            Step::UnpackList { .. } => "unpack_list",
            Step::Coalesce { .. } => "coalesce_columns",
            Step::FillNa { .. } => "fillna_column",
            Step::UnpackNested { .. } => "unpack_nested_columns_as_rows",
            Step::LongTable { .. } => "long_table",
            Step::Select(_) => "select_rows",
            Step::MatchColumns { .. } => "match_columns",
            Step::Cut(_) => "cut",
            Step::RemoveNullRows(_) => "remove_null_rows",
            Step::ConvertToStr => "convert_columns_to_str",
        }
    }

    /// Apply this step, returning the table the next step works on
    pub fn apply(&self, mut table: Table) -> Result<Table> {
        match self {
            Step::SortBy(columns) => {
                table.sort_by(&as_strs(columns))?;
            }
            Step::UnpackDict { column, options } => {
                table.unpack_dict(column, options)?;
            }
            Step::UnpackList { column, options } => {
                if let Some(preview) = table.unpack_list(column, options)? {
                    return Ok(preview);
                }
            }
            Step::Coalesce {
                dest,
                sources,
                remove_sources,
            } => {
                table.coalesce_columns(dest, &as_strs(sources), *remove_sources)?;
            }
            Step::FillNa { column, value } => {
                table.fillna_column(column, value.clone())?;
            }
            Step::UnpackNested {
                column,
                key,
                expand_original,
            } => return table.unpack_nested_columns_as_rows(column, key, *expand_original),
            Step::LongTable {
                key,
                column,
                options,
            } => return table.long_table(&as_strs(key), column, options),
            Step::Select(expr) => {
                return table.select_rows(&[RowFilter::Expr(expr.clone())]);
            }
            Step::MatchColumns { desired, options } => {
                table.match_columns(&as_strs(desired), options)?;
            }
            Step::Cut(columns) => return table.cut(&as_strs(columns)),
            Step::RemoveNullRows(columns) => {
                table.remove_null_rows(&as_strs(columns))?;
            }
            Step::ConvertToStr => {
                table.convert_columns_to_str()?;
            }
        }
        Ok(table)
    }
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Apply `steps` in order
pub fn run_pipeline(mut table: Table, steps: &[Step]) -> Result<Table> {
    for step in steps {
        debug!(step = step.name(), rows = table.row_count(), "applying step");
        table = step.apply(table)?;
    }
    info!(
        steps = steps.len(),
        rows = table.row_count(),
        columns = table.column_count(),
        "pipeline finished"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    fn people() -> Table {
        Table::from_rows(
            ["id", "name", "info", "tags"],
            vec![
                vec![
                    CellValue::Int(2),
                    CellValue::from("bob"),
                    CellValue::map([("city", CellValue::from("Oslo"))]),
                    CellValue::from(vec!["x"]),
                ],
                vec![
                    CellValue::Int(1),
                    CellValue::Null,
                    CellValue::map([("city", CellValue::from("Rome"))]),
                    CellValue::from(vec!["y", "z"]),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_steps_run_in_order() {
        let steps = vec![
            Step::SortBy(vec!["id".into()]),
            Step::UnpackDict {
                column: "info".into(),
                options: UnpackDictOptions::default(),
            },
            Step::FillNa {
                column: "name".into(),
                value: CellValue::from("anon"),
            },
            Step::Select(Expr::parse("{info_city} != 'Oslo'").unwrap()),
            Step::Cut(vec!["name".into(), "info_city".into()]),
        ];

        let out = run_pipeline(people(), &steps).unwrap();
        assert_eq!(out.columns(), &["name", "info_city"]);
        assert_eq!(out.row_count(), 1);
        assert_eq!(
            out.row(0).unwrap().values(),
            &[CellValue::from("anon"), CellValue::from("Rome")]
        );
    }

    #[test]
    fn test_unpack_list_preview_replaces_pipeline_table() {
        let steps = vec![Step::UnpackList {
            column: "tags".into(),
            options: UnpackListOptions::default(),
        }];
        let out = run_pipeline(people(), &steps).unwrap();
        assert_eq!(out.columns(), &["id", "name", "info", "tags_0", "tags_1"]);
    }

    #[test]
    fn test_long_table_step() {
        let steps = vec![Step::LongTable {
            key: vec!["id".into()],
            column: "tags".into(),
            options: LongTableOptions::default(),
        }];
        let out = run_pipeline(people(), &steps).unwrap();
        assert_eq!(out.columns(), &["id", "tags"]);
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn test_failing_step_stops_pipeline() {
        let steps = vec![
            Step::ConvertToStr,
            Step::RemoveNullRows(vec!["missing".into()]),
        ];
        let err = run_pipeline(people(), &steps).unwrap_err();
        assert_eq!(err, TableError::UnknownColumn("missing".into()));
    }
}
