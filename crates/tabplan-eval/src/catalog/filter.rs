//! Row filtering by a single column comparison.

use super::params::{CompareOp, FilterParams};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use tabplan_types::{Cell, ColumnType, PlanError, Table};

/// The right-hand side of a comparison, coerced to the column's type.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Num(f64),
    Bool(bool),
    Str(String),
}

fn coerce(ty: ColumnType, column: &str, value: &JsonValue) -> Result<Operand, PlanError> {
    let non_numeric = || {
        PlanError::incompatible(format!(
            "cannot compare non-numeric value '{}' with numeric column '{column}'",
            display_value(value)
        ))
    };
    match ty {
        ColumnType::Int | ColumnType::Float => match value {
            JsonValue::Number(n) => n.as_f64().map(Operand::Num).ok_or_else(non_numeric),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_nan())
                .map(Operand::Num)
                .ok_or_else(non_numeric),
            _ => Err(non_numeric()),
        },
        ColumnType::Bool => match value {
            JsonValue::Bool(b) => Ok(Operand::Bool(*b)),
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Ok(Operand::Bool(true)),
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Ok(Operand::Bool(false)),
            _ => Err(mismatch(ty, column, value)),
        },
        ColumnType::Str => match value {
            JsonValue::String(s) => Ok(Operand::Str(s.clone())),
            JsonValue::Bool(b) => Ok(Operand::Str(b.to_string())),
            _ => Err(mismatch(ty, column, value)),
        },
    }
}

fn mismatch(ty: ColumnType, column: &str, value: &JsonValue) -> PlanError {
    let what = match value {
        JsonValue::Number(_) => "numeric",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Null => "null",
        _ => "non-scalar",
    };
    PlanError::incompatible(format!(
        "cannot compare {what} value '{}' with {ty} column '{column}'",
        display_value(value)
    ))
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Float equality within a relative tolerance.
fn num_ordering(a: f64, b: f64, tolerance: f64) -> Option<Ordering> {
    if (a - b).abs() <= tolerance * a.abs().max(b.abs()) {
        Some(Ordering::Equal)
    } else {
        a.partial_cmp(&b)
    }
}

fn ordering(cell: &Cell, operand: &Operand, tolerance: f64) -> Option<Ordering> {
    match (cell, operand) {
        (Cell::Int(i), Operand::Num(v)) => {
            if v.fract() == 0.0 && v.abs() < 9.0e15 {
                Some(i.cmp(&(*v as i64)))
            } else {
                (*i as f64).partial_cmp(v)
            }
        }
        (Cell::Float(f), Operand::Num(v)) => num_ordering(*f, *v, tolerance),
        (Cell::Bool(b), Operand::Bool(v)) => Some(b.cmp(v)),
        (Cell::Str(s), Operand::Str(v)) => Some(s.as_str().cmp(v.as_str())),
        _ => None,
    }
}

/// Whether a row's cell satisfies `cell <op> operand`.
///
/// Missing or incomparable cells satisfy only `!=`, so `==` and `!=` always
/// partition the rows.
fn holds(cell: &Cell, op: CompareOp, operand: &Operand, tolerance: f64) -> bool {
    let ord = if cell.is_missing() {
        None
    } else {
        ordering(cell, operand, tolerance)
    };
    match (op, ord) {
        (CompareOp::Ne, None) => true,
        (_, None) => false,
        (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
        (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
        (CompareOp::Lt, Some(o)) => o == Ordering::Less,
        (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
        (CompareOp::Ge, Some(o)) => o != Ordering::Less,
    }
}

pub(crate) fn filter(table: &Table, p: &FilterParams, tolerance: f64) -> Result<Table, PlanError> {
    let col = table
        .column(&p.column)
        .ok_or_else(|| PlanError::column(&p.column))?;
    let operand = coerce(col.inferred_type(), &p.column, &p.value)?;
    tracing::debug!(column = %p.column, op = %p.op, value = %p.value, "filtering rows");

    let keep: Vec<usize> = col
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| holds(cell, p.op, &operand, tolerance))
        .map(|(i, _)| i)
        .collect();
    Ok(table.take_rows(&keep))
}
