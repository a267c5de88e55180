//! Cell values: scalars plus nested lists and mappings

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::Serialize;

use super::schema::CellType;

/// A JSON-like cell value
///
/// Semi-structured input keeps its nesting here: `List` and `Map` cells are
/// what the unpack operations flatten into columns or rows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<CellValue>),
    Map(IndexMap<String, CellValue>),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            (CellValue::List(a), CellValue::List(b)) => a == b,
            (CellValue::Map(a), CellValue::Map(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

/// Bits hashed for any number, so that `Int(1)` and `Float(1.0)` agree
fn number_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Int and Float compare equal across variants, so they share a tag
        match self {
            CellValue::Int(_) | CellValue::Float(_) => 2u8.hash(state),
            other => std::mem::discriminant(other).hash(state),
        }
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => number_bits(*i as f64).hash(state),
            CellValue::Float(f) => number_bits(*f).hash(state),
            CellValue::String(s) => s.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
            CellValue::List(items) => items.hash(state),
            CellValue::Map(map) => {
                // Map equality ignores entry order, so the hash must too
                map.len().hash(state);
                let combined = map.iter().fold(0u64, |acc, (k, v)| {
                    let mut hasher = FxHasher::default();
                    k.hash(&mut hasher);
                    v.hash(&mut hasher);
                    acc.wrapping_add(hasher.finish())
                });
                combined.hash(state);
            }
        }
    }
}

impl CellValue {
    /// Build a `Map` cell from key/value pairs, keeping their order
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        CellValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, CellValue::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, CellValue::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CellValue]> {
        match self {
            CellValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, CellValue>> {
        match self {
            CellValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Element count of a list, or entry count of a map
    pub fn nested_len(&self) -> Option<usize> {
        match self {
            CellValue::List(items) => Some(items.len()),
            CellValue::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Runtime type of this value
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::List(_) => CellType::List,
            CellValue::Map(_) => CellType::Map,
        }
    }

    /// Truthiness used by coalescing, `fillna` and bare filter operands
    ///
    /// Null, `false`, zero, and empty strings/lists/maps are all "empty".
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Int(i) => *i != 0,
            CellValue::Float(f) => *f != 0.0,
            CellValue::String(s) => !s.is_empty(),
            CellValue::Date(_) | CellValue::DateTime(_) => true,
            CellValue::List(items) => !items.is_empty(),
            CellValue::Map(map) => !map.is_empty(),
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_str()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
            CellValue::List(_) | CellValue::Map(_) => {
                Cow::Owned(serde_json::to_string(self).unwrap_or_default())
            }
        }
    }

    /// String form written into a flat text cell; null becomes empty
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            other => other.display(),
        }
    }

    /// Partial ordering for comparisons in filter expressions
    ///
    /// Numbers compare across int/float, dates across date/datetime.
    /// Values of unrelated types are unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => Some(Ordering::Equal),
            (CellValue::Bool(a), CellValue::Bool(b)) => Some(a.cmp(b)),
            (CellValue::Int(a), CellValue::Int(b)) => Some(a.cmp(b)),
            (CellValue::Float(a), CellValue::Float(b)) => a.partial_cmp(b),
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64).partial_cmp(b),
            (CellValue::Float(a), CellValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (CellValue::String(a), CellValue::String(b)) => Some(a.cmp(b)),
            (CellValue::Date(a), CellValue::Date(b)) => Some(a.cmp(b)),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => Some(a.cmp(b)),
            (CellValue::Date(a), CellValue::DateTime(b)) => Some(a.and_hms_opt(0, 0, 0)?.cmp(b)),
            (CellValue::DateTime(a), CellValue::Date(b)) => Some(a.cmp(&b.and_hms_opt(0, 0, 0)?)),
            (CellValue::List(a), CellValue::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Total ordering used when sorting rows
    ///
    /// Values are ranked by type first (null sorts first), then by value.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match self.compare(other) {
            Some(ord) => ord,
            None => {
                let rank = self.sort_rank().cmp(&other.sort_rank());
                if rank == Ordering::Equal {
                    // Same rank but unordered: NaN floats, maps
                    self.display().cmp(&other.display())
                } else {
                    rank
                }
            }
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::String(_) => 3,
            CellValue::Date(_) | CellValue::DateTime(_) => 4,
            CellValue::List(_) => 5,
            CellValue::Map(_) => 6,
        }
    }

    /// Convert a parsed JSON value, keeping nested arrays and objects
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(n.to_string())
                }
            }
            Value::String(s) => {
                // Try parsing as date/datetime
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return CellValue::Date(date);
                }
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    return CellValue::DateTime(dt);
                }
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                    return CellValue::DateTime(dt);
                }
                CellValue::String(s.clone())
            }
            Value::Array(arr) => CellValue::List(arr.iter().map(CellValue::from_json).collect()),
            Value::Object(obj) => CellValue::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into a JSON value for serialization
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Int(i) => serde_json::json!(*i),
            CellValue::Float(f) => serde_json::json!(*f),
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Date(d) => Value::String(d.to_string()),
            CellValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            CellValue::List(items) => Value::Array(items.iter().map(CellValue::to_json).collect()),
            CellValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Vec<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(items: Vec<T>) -> Self {
        CellValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, CellValue>> for CellValue {
    fn from(map: IndexMap<String, CellValue>) -> Self {
        CellValue::Map(map)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        CellValue::from_json(value)
    }
}
