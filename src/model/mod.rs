//! Data model for semi-structured tables

mod key;
mod schema;
mod table;
mod value;

pub use key::RowHasher;
pub use schema::{CellType, ColumnTypeStats};
pub use table::{Record, Row, Table};
pub use value::CellValue;

pub(crate) use table::check_unique;
