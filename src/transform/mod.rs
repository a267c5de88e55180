//! Table transformations
//!
//! Every operation is an inherent method on [`Table`](crate::model::Table).
//! Mutating operations return `&mut Table` so calls can be chained with `?`;
//! operations producing an independent result return a new table.

mod columns;
mod conform;
mod expr;
mod long;
mod nested;
mod reduce;
mod select;
mod setops;
mod types;
mod unpack;

pub use columns::ColumnFill;
pub use conform::{normalize_column_name, ExtraColumns, MatchColumnsOptions, MissingColumns};
pub use expr::{CompareOp, Expr};
pub use long::LongTableOptions;
pub use nested::ExpandOriginal;
pub use select::RowFilter;
pub use unpack::{UnpackDictOptions, UnpackListOptions};
