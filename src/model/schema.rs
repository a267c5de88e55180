//! Column type information

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Runtime type of a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    List,
    Map,
    Mixed,
}

impl CellType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            _ => CellType::Mixed,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
            CellType::Date => write!(f, "date"),
            CellType::DateTime => write!(f, "datetime"),
            CellType::List => write!(f, "list"),
            CellType::Map => write!(f, "map"),
            CellType::Mixed => write!(f, "mixed"),
        }
    }
}

/// Distinct types observed in one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeStats {
    /// Column name
    pub name: String,
    /// Distinct types, in first-seen order
    pub types: IndexSet<CellType>,
    /// All observed types widened into one
    pub inferred: CellType,
}

impl ColumnTypeStats {
    pub fn new(name: impl Into<String>, types: IndexSet<CellType>) -> Self {
        let inferred = types
            .iter()
            .fold(CellType::Null, |acc, t| acc.widen(*t));
        Self {
            name: name.into(),
            types,
            inferred,
        }
    }

    /// True when every value in the column is a string
    pub fn is_all_strings(&self) -> bool {
        self.types.len() == 1 && self.types.contains(&CellType::String)
    }
}

impl std::fmt::Display for ColumnTypeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self.types.iter().map(ToString::to_string).collect();
        write!(f, "{}: {} [{}]", self.name, self.inferred, types.join(", "))
    }
}
