//! tablemorph - Reshape semi-structured records into flat tables
//!
//! A [`Table`] holds named columns and rows of [`CellValue`]s, where a cell
//! may itself be a list or a map. The transformation methods flatten that
//! nesting: unpack maps and lists into columns, unpivot lists into long
//! tables, expand nested values into rows, coalesce, conform to a desired
//! schema, filter, group and chunk.
//!
//! ```
//! use tablemorph::{CellValue, Table, UnpackDictOptions};
//!
//! let mut table = Table::from_rows(
//!     ["id", "info"],
//!     vec![vec![CellValue::Int(1), CellValue::map([("city", CellValue::from("Oslo"))])]],
//! )?;
//! table.unpack_dict("info", &UnpackDictOptions::default())?;
//! assert_eq!(table.columns(), &["id", "info_city"]);
//! # Ok::<(), tablemorph::TableError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod transform;

pub use config::Config;
pub use error::{Result, TableError};
pub use model::{CellType, CellValue, ColumnTypeStats, Record, Row, Table};
pub use pipeline::{run_pipeline, Step};
pub use transform::{
    ColumnFill, ExpandOriginal, Expr, ExtraColumns, LongTableOptions, MatchColumnsOptions,
    MissingColumns, RowFilter, UnpackDictOptions, UnpackListOptions,
};
