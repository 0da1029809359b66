//! Row ordering by one column.

use super::params::{SortOrder, SortParams};
use tabplan_types::{PlanError, Table};

/// Stable single-column sort. Missing cells go last in either direction.
pub(crate) fn sort(table: &Table, p: &SortParams) -> Result<Table, PlanError> {
    let col = table
        .column(&p.column)
        .ok_or_else(|| PlanError::column(&p.column))?;
    tracing::debug!(column = %p.column, order = %p.order, "sorting rows");

    let cells = &col.cells;
    let mut order: Vec<usize> = (0..cells.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (&cells[a], &cells[b]);
        match (x.is_missing(), y.is_missing()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => match p.order {
                SortOrder::Ascending => x.total_cmp(y),
                SortOrder::Descending => y.total_cmp(x),
            },
        }
    });
    Ok(table.take_rows(&order))
}
