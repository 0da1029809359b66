//! Table cells and inferred column types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// A single table cell.
///
/// Serializes untagged, so a cell is written as the bare JSON scalar.
/// Non-finite floats serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `Null` or a `NaN` float: a missing value.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell (`Int` and `Float` only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a JSON value. `NaN` and infinities become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Str(s) => JsonValue::String(s.clone()),
        }
    }

    /// Total order over non-null cells.
    ///
    /// Booleans sort before numbers, numbers before strings. Numbers compare
    /// by value across `Int` and `Float`. `Null` sorts after everything;
    /// callers that need nulls placed independently of direction must handle
    /// them before calling this.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Str(_) => 2,
            Self::Null => 3,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NaN"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// The type of a column, inferred from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Str,
}

impl ColumnType {
    /// Infer a column type.
    ///
    /// All-`Int` is `Int`; any mix of `Int`/`Float` is `Float`; all-`Bool` is
    /// `Bool`; anything else is `Str`. A column with no non-null cells is
    /// `Float`, matching a column of missing numeric values.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut seen: Option<ColumnType> = None;
        for cell in cells {
            let ty = match cell {
                Cell::Null => continue,
                Cell::Bool(_) => ColumnType::Bool,
                Cell::Int(_) => ColumnType::Int,
                Cell::Float(_) => ColumnType::Float,
                Cell::Str(_) => return ColumnType::Str,
            };
            seen = Some(match (seen, ty) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(ColumnType::Int), ColumnType::Float)
                | (Some(ColumnType::Float), ColumnType::Int) => ColumnType::Float,
                _ => return ColumnType::Str,
            });
        }
        seen.unwrap_or(ColumnType::Float)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Str => write!(f, "string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_int_column() {
        let cells = [Cell::Int(1), Cell::Null, Cell::Int(3)];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Int);
    }

    #[test]
    fn infer_mixed_numeric_is_float() {
        let cells = [Cell::Int(1), Cell::Float(2.5)];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Float);
    }

    #[test]
    fn infer_all_null_is_float() {
        let cells = [Cell::Null, Cell::Null];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Float);
        assert!(ColumnType::infer(&cells).is_numeric());
    }

    #[test]
    fn infer_mixed_kinds_is_str() {
        let cells = [Cell::Int(1), Cell::Bool(true)];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Str);
    }

    #[test]
    fn nan_serializes_as_null() {
        assert_eq!(Cell::Float(f64::NAN).to_json(), JsonValue::Null);
        assert_eq!(
            serde_json::to_string(&Cell::Float(f64::NAN)).unwrap(),
            "null"
        );
    }

    #[test]
    fn cross_numeric_ordering() {
        assert_eq!(Cell::Int(2).total_cmp(&Cell::Float(1.5)), Ordering::Greater);
        assert_eq!(Cell::Int(2).total_cmp(&Cell::Float(2.0)), Ordering::Equal);
        assert_eq!(Cell::Null.total_cmp(&Cell::Int(0)), Ordering::Greater);
    }
}
