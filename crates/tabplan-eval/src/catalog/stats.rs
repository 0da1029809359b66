//! Column reductions: `sum` and `average`, shared with group-and-aggregate.

use super::params::ColumnParams;
use tabplan_types::{Cell, Column, ColumnType, PlanError, Table, Value};

/// Look up a column that must be numeric.
pub(crate) fn numeric_column<'t>(
    table: &'t Table,
    column: &str,
    what: &str,
) -> Result<&'t Column, PlanError> {
    let col = table
        .column(column)
        .ok_or_else(|| PlanError::column(column))?;
    if !col.is_numeric() {
        return Err(PlanError::incompatible(format!(
            "column '{column}' is {}, not numeric. Cannot calculate {what}",
            col.inferred_type()
        )));
    }
    Ok(col)
}

/// Sum of the non-missing cells.
///
/// Int columns sum to `Int`, falling back to `Float` on overflow. An empty
/// column sums to zero.
pub(crate) fn sum_cells<'a>(cells: impl Iterator<Item = &'a Cell> + Clone, ty: ColumnType) -> Cell {
    if ty == ColumnType::Int {
        let mut acc: i64 = 0;
        let mut overflowed = false;
        for cell in cells.clone() {
            if let Cell::Int(i) = cell {
                match acc.checked_add(*i) {
                    Some(v) => acc = v,
                    None => {
                        overflowed = true;
                        break;
                    }
                }
            }
        }
        if !overflowed {
            return Cell::Int(acc);
        }
    }
    Cell::Float(
        cells
            .filter(|c| !c.is_missing())
            .filter_map(Cell::as_f64)
            .sum(),
    )
}

/// Arithmetic mean of the non-missing cells; `Null` when there are none.
pub(crate) fn mean_cells<'a>(cells: impl Iterator<Item = &'a Cell>) -> Cell {
    let (total, count) = cells
        .filter(|c| !c.is_missing())
        .filter_map(Cell::as_f64)
        .fold((0.0_f64, 0_usize), |(t, n), v| (t + v, n + 1));
    if count == 0 {
        Cell::Null
    } else {
        Cell::Float(total / count as f64)
    }
}

pub(crate) fn sum(table: &Table, p: &ColumnParams) -> Result<Value, PlanError> {
    let col = numeric_column(table, &p.column, "sum")?;
    tracing::debug!(column = %p.column, "calculating sum");
    Ok(sum_cells(col.cells.iter(), col.inferred_type()).into())
}

pub(crate) fn average(table: &Table, p: &ColumnParams) -> Result<Value, PlanError> {
    let col = numeric_column(table, &p.column, "average")?;
    tracing::debug!(column = %p.column, "calculating average");
    Ok(mean_cells(col.cells.iter()).into())
}
