//! Conforming a table to a desired column list

use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{CellValue, Table};

/// What to do with table columns that match no desired column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraColumns {
    #[default]
    Remove,
    Ignore,
    Fail,
}

impl FromStr for ExtraColumns {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remove" => Ok(ExtraColumns::Remove),
            "ignore" => Ok(ExtraColumns::Ignore),
            "fail" => Ok(ExtraColumns::Fail),
            _ => Err(TableError::invalid(format!(
                "invalid option {s:?} for if_extra_columns"
            ))),
        }
    }
}

/// What to do with desired columns the table lacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingColumns {
    #[default]
    Add,
    Ignore,
    Fail,
}

impl FromStr for MissingColumns {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(MissingColumns::Add),
            "ignore" => Ok(MissingColumns::Ignore),
            "fail" => Ok(MissingColumns::Fail),
            _ => Err(TableError::invalid(format!(
                "invalid option {s:?} for if_missing_columns"
            ))),
        }
    }
}

/// Options for [`Table::match_columns`]
#[derive(Debug, Clone)]
pub struct MatchColumnsOptions {
    /// Compare names after [`normalize_column_name`]
    pub fuzzy_match: bool,
    pub if_extra_columns: ExtraColumns,
    pub if_missing_columns: MissingColumns,
}

impl Default for MatchColumnsOptions {
    fn default() -> Self {
        Self {
            fuzzy_match: true,
            if_extra_columns: ExtraColumns::default(),
            if_missing_columns: MissingColumns::default(),
        }
    }
}

impl MatchColumnsOptions {
    /// Build options from policy strings, as received from configuration
    pub fn from_policies(fuzzy_match: bool, if_extra: &str, if_missing: &str) -> Result<Self> {
        Ok(Self {
            fuzzy_match,
            if_extra_columns: if_extra.parse()?,
            if_missing_columns: if_missing.parse()?,
        })
    }
}

/// Lowercase a column name and keep only its alphanumeric characters
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

impl Table {
    /// Reshape the table to match `desired` columns
    ///
    /// Matched columns are renamed to the desired spelling and moved to the
    /// front in desired order; ignored extras follow in their current order.
    /// When two table columns normalize to the same name the first one
    /// matches and later ones are extras.
    pub fn match_columns(
        &mut self,
        desired: &[&str],
        options: &MatchColumnsOptions,
    ) -> Result<&mut Self> {
        let normalize = |name: &str| {
            if options.fuzzy_match {
                normalize_column_name(name)
            } else {
                name.to_string()
            }
        };

        let mut unmatched: IndexMap<String, &str> = IndexMap::with_capacity(desired.len());
        for name in desired {
            if unmatched.insert(normalize(name), *name).is_some() {
                return Err(TableError::invalid(format!(
                    "desired column {name:?} is listed more than once"
                )));
            }
        }

        let mut extras: Vec<String> = Vec::new();
        for column in &self.columns {
            if unmatched.shift_remove(&normalize(column)).is_some() {
                continue;
            }
            match options.if_extra_columns {
                ExtraColumns::Fail => {
                    return Err(TableError::SchemaMismatch {
                        column: column.clone(),
                        reason: "table has an extra column".into(),
                    })
                }
                ExtraColumns::Remove => extras.push(column.clone()),
                ExtraColumns::Ignore => {}
            }
        }

        let mut by_normalized: IndexMap<String, String> = IndexMap::new();
        for column in &self.columns {
            by_normalized
                .entry(normalize(column))
                .or_insert_with(|| column.clone());
        }

        let missing: Vec<&str> = desired
            .iter()
            .copied()
            .filter(|name| !by_normalized.contains_key(&normalize(name)))
            .collect();
        if let (MissingColumns::Fail, Some(name)) = (options.if_missing_columns, missing.first()) {
            return Err(TableError::SchemaMismatch {
                column: name.to_string(),
                reason: "table is missing a desired column".into(),
            });
        }

        // A kept extra may already hold the spelling a match is renamed to
        for name in desired {
            let Some(existing) = by_normalized.get(&normalize(name)) else {
                continue;
            };
            let taken = existing != name
                && !extras.iter().any(|extra| extra == name)
                && self.has_column(name);
            if taken {
                return Err(TableError::SchemaMismatch {
                    column: name.to_string(),
                    reason: format!("cannot rename {existing:?}, an extra column has this name"),
                });
            }
        }

        if !extras.is_empty() {
            debug!(?extras, "removing extra columns");
            let extras: Vec<&str> = extras.iter().map(String::as_str).collect();
            self.remove_column(&extras)?;
        }

        match (options.if_missing_columns, missing.first()) {
            (_, None) | (MissingColumns::Ignore | MissingColumns::Fail, _) => {}
            (MissingColumns::Add, Some(_)) => {
                debug!(?missing, "adding missing columns");
                for name in &missing {
                    self.add_column(name, CellValue::Null, None)?;
                    by_normalized.insert(normalize(name), name.to_string());
                }
            }
        }

        let mut position = 0;
        for name in desired {
            let Some(existing) = by_normalized.get(&normalize(name)) else {
                continue;
            };
            if existing != name {
                self.rename_column(existing, name)?;
            }
            self.move_column(name, position)?;
            position += 1;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Table {
        Table::from_rows(
            ["a", "b", "c"],
            vec![vec![1.into(), 2.into(), 3.into()]],
        )
        .unwrap()
    }

    #[test]
    fn test_reorder_and_remove_extra() {
        let mut table = abc();
        table
            .match_columns(&["b", "a"], &MatchColumnsOptions::default())
            .unwrap();

        assert_eq!(table.columns(), &["b", "a"]);
        assert_eq!(table.row(0).unwrap().values(), &[CellValue::Int(2), CellValue::Int(1)]);
        table.assert_schema_total();
    }

    #[test]
    fn test_fuzzy_rename_and_add_missing() {
        let mut table = Table::from_rows(
            ["First Name", "LAST_NAME"],
            vec![vec!["Ann".into(), "Lee".into()]],
        )
        .unwrap();

        table
            .match_columns(&["email", "first_name", "lastname"], &MatchColumnsOptions::default())
            .unwrap();

        assert_eq!(table.columns(), &["email", "first_name", "lastname"]);
        let row = table.row(0).unwrap();
        assert_eq!(row.get("email"), Some(&CellValue::Null));
        assert_eq!(row.get("first_name"), Some(&CellValue::from("Ann")));
        table.assert_schema_total();
    }

    #[test]
    fn test_exact_match_treats_variants_as_extra() {
        let mut table = Table::from_rows(["First Name"], vec![vec!["Ann".into()]]).unwrap();
        let options = MatchColumnsOptions {
            fuzzy_match: false,
            ..Default::default()
        };
        table.match_columns(&["first_name"], &options).unwrap();

        assert_eq!(table.columns(), &["first_name"]);
        assert_eq!(table.row(0).unwrap().get("first_name"), Some(&CellValue::Null));
    }

    #[test]
    fn test_ignore_extra_keeps_them_after_desired() {
        let mut table = abc();
        let options = MatchColumnsOptions::from_policies(true, "ignore", "ignore").unwrap();
        table.match_columns(&["c", "zz", "a"], &options).unwrap();

        assert_eq!(table.columns(), &["c", "a", "b"]);
    }

    #[test]
    fn test_normalized_collision_second_is_extra() {
        let mut table = Table::from_rows(
            ["Name", "name!"],
            vec![vec!["first".into(), "second".into()]],
        )
        .unwrap();
        table
            .match_columns(&["name"], &MatchColumnsOptions::default())
            .unwrap();

        assert_eq!(table.columns(), &["name"]);
        assert_eq!(table.row(0).unwrap().get("name"), Some(&CellValue::from("first")));
    }

    #[test]
    fn test_fail_policies() {
        let options = MatchColumnsOptions::from_policies(true, "fail", "add").unwrap();
        let err = abc().match_columns(&["a", "b"], &options).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { ref column, .. } if column == "c"));

        let options = MatchColumnsOptions::from_policies(true, "ignore", "fail").unwrap();
        let err = abc().match_columns(&["a", "d"], &options).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { ref column, .. } if column == "d"));
    }

    #[test]
    fn test_missing_failure_leaves_table_untouched() {
        let mut table = abc();
        let options = MatchColumnsOptions::from_policies(true, "remove", "fail").unwrap();
        assert!(table.match_columns(&["a", "d"], &options).is_err());
        assert_eq!(table, abc());
    }

    #[test]
    fn test_rename_onto_kept_extra_fails_untouched() {
        let original = Table::from_rows(
            ["NAME", "name"],
            vec![vec!["upper".into(), "lower".into()]],
        )
        .unwrap();
        let mut table = original.clone();
        let options = MatchColumnsOptions::from_policies(true, "ignore", "add").unwrap();

        let err = table.match_columns(&["name"], &options).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { ref column, .. } if column == "name"));
        assert_eq!(table, original);
    }

    #[test]
    fn test_rename_onto_removed_extra_succeeds() {
        let mut table = Table::from_rows(
            ["NAME", "name"],
            vec![vec!["upper".into(), "lower".into()]],
        )
        .unwrap();
        table
            .match_columns(&["name"], &MatchColumnsOptions::default())
            .unwrap();

        assert_eq!(table.columns(), &["name"]);
        assert_eq!(table.row(0).unwrap().get("name"), Some(&CellValue::from("upper")));
        table.assert_schema_total();
    }

    #[test]
    fn test_invalid_policy_string() {
        let err = MatchColumnsOptions::from_policies(true, "drop", "add").unwrap_err();
        assert!(matches!(err, TableError::InvalidArgument(_)));
        assert!("maybe".parse::<MissingColumns>().is_err());
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name(" First_Name "), "firstname");
        assert_eq!(normalize_column_name("ZIP-code 5"), "zipcode5");
    }
}
