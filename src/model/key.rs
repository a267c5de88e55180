//! Content-hash row identifiers

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::table::Row;
use super::value::CellValue;

/// Builds a stable identifier from a row's cell values
///
/// The identifier is an order-sensitive hash over the display form of each
/// value, so identical rows always receive the same id across runs.
pub struct RowHasher {
    separator: String,
}

impl Default for RowHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl RowHasher {
    /// Create a new row hasher
    pub fn new() -> Self {
        Self {
            separator: "|".to_string(),
        }
    }

    /// Set the separator placed between values before hashing
    pub fn with_separator(mut self, sep: impl Into<String>) -> Self {
        self.separator = sep.into();
        self
    }

    /// Build the pre-hash key string from cell values
    pub fn build_key(&self, cells: &[CellValue]) -> String {
        cells
            .iter()
            .map(|c| c.display().into_owned())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Hash cell values into a 16 digit hex id
    pub fn hash_cells(&self, cells: &[CellValue]) -> String {
        let key = self.build_key(cells);
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    pub fn hash_row(&self, row: &Row<'_>) -> String {
        self.hash_cells(row.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_order_sensitive() {
        let hasher = RowHasher::new();
        let a = vec![CellValue::from("x"), CellValue::Int(1)];
        let b = vec![CellValue::Int(1), CellValue::from("x")];

        assert_eq!(hasher.hash_cells(&a), hasher.hash_cells(&a.clone()));
        assert_ne!(hasher.hash_cells(&a), hasher.hash_cells(&b));
        assert_eq!(hasher.hash_cells(&a).len(), 16);
    }

    #[test]
    fn test_build_key_uses_separator() {
        let hasher = RowHasher::new().with_separator(",");
        let cells = vec![CellValue::from("a"), CellValue::Null, CellValue::Int(3)];
        assert_eq!(hasher.build_key(&cells), "a,NULL,3");
    }
}
