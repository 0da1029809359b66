//! Values flowing between plan steps.

use crate::cell::Cell;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// The two kinds of value a binding can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Table,
    Scalar,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// A step result or binding.
///
/// Tables are shared by reference count; they are never mutated once
/// bound. `Scalar` covers numbers, strings, booleans, null and nested
/// JSON structures.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Table(Arc<Table>),
    Scalar(JsonValue),
}

impl Value {
    pub fn table(table: Table) -> Self {
        Self::Table(Arc::new(table))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Table(_) => ValueKind::Table,
            Self::Scalar(_) => ValueKind::Scalar,
        }
    }

    pub fn as_table(&self) -> Option<&Arc<Table>> {
        match self {
            Self::Table(t) => Some(t),
            Self::Scalar(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(JsonValue::Null))
    }

    /// Canonical JSON form: tables become row-records.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Table(t) => t.to_json(),
            Self::Scalar(v) => v.clone(),
        }
    }

    /// Short shape description for trace output.
    pub fn describe(&self) -> String {
        match self {
            Self::Table(t) => {
                let (rows, cols) = t.shape();
                format!("table ({rows} rows x {cols} columns)")
            }
            Self::Scalar(v) => format!("scalar {v}"),
        }
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Self::table(table)
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        Self::Scalar(cell.to_json())
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Self::Scalar(v)
    }
}
