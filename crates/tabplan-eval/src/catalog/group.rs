//! `group-and-aggregate`: one row per distinct group key.

use super::key::CellKey;
use super::params::{AggFunc, Aggregation, GroupParams};
use super::stats::{mean_cells, numeric_column, sum_cells};
use std::collections::BTreeMap;
use tabplan_types::{Cell, Column, PlanError, Table};

pub(crate) fn group_aggregate(table: &Table, p: &GroupParams) -> Result<Table, PlanError> {
    let missing = table.missing_columns(
        p.by.iter()
            .chain(p.aggregations.iter().map(|a| &a.column))
            .map(String::as_str),
    );
    if !missing.is_empty() {
        let mut unique: Vec<String> = Vec::new();
        for name in missing {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        return Err(PlanError::ColumnNotFound(unique));
    }
    for agg in &p.aggregations {
        if matches!(agg.func, AggFunc::Sum | AggFunc::Mean) {
            numeric_column(table, &agg.column, agg.func.name())?;
        }
    }

    let key_columns: Vec<&Column> = p
        .by
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mut groups: BTreeMap<Vec<CellKey>, Vec<usize>> = BTreeMap::new();
    for row in 0..table.row_count() {
        let key: Vec<CellKey> = key_columns
            .iter()
            .map(|c| CellKey::new(&c.cells[row]))
            .collect();
        if key.iter().any(CellKey::is_null) {
            continue;
        }
        groups.entry(key).or_default().push(row);
    }
    tracing::debug!(by = ?p.by, groups = groups.len(), "grouped rows");

    let mut out: Vec<Column> = Vec::new();
    for col in &key_columns {
        let cells = groups.values().map(|rows| col.cells[rows[0]].clone()).collect();
        put(&mut out, Column::new(col.name.clone(), cells));
    }
    for agg in &p.aggregations {
        let cells = groups
            .values()
            .map(|rows| aggregate(table, agg, rows))
            .collect::<Result<Vec<_>, PlanError>>()?;
        put(&mut out, Column::new(agg.output.clone(), cells));
    }
    Ok(Table::new(out)?)
}

/// Append a column, replacing an earlier one of the same name in place.
fn put(out: &mut Vec<Column>, column: Column) {
    match out.iter_mut().find(|c| c.name == column.name) {
        Some(existing) => *existing = column,
        None => out.push(column),
    }
}

fn aggregate(table: &Table, agg: &Aggregation, rows: &[usize]) -> Result<Cell, PlanError> {
    let col = table
        .column(&agg.column)
        .ok_or_else(|| PlanError::column(&agg.column))?;
    let cells = rows.iter().map(|&r| &col.cells[r]);
    Ok(match agg.func {
        AggFunc::Sum => sum_cells(cells, col.inferred_type()),
        AggFunc::Mean => mean_cells(cells),
        AggFunc::Count => Cell::Int(cells.filter(|c| !c.is_missing()).count() as i64),
        AggFunc::Min => cells
            .filter(|c| !c.is_missing())
            .min_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or(Cell::Null),
        AggFunc::Max => cells
            .filter(|c| !c.is_missing())
            .max_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or(Cell::Null),
    })
}
