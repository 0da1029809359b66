//! Single-key equality joins.

use super::key::CellKey;
use super::params::{JoinKind, MergeParams};
use std::collections::BTreeMap;
use tabplan_types::{Cell, Column, PlanError, Table};

/// Row pairing: `(left row, right row)`; `None` marks the unmatched side.
type Pairing = (Option<usize>, Option<usize>);

fn index_by_key(col: &Column) -> BTreeMap<CellKey, Vec<usize>> {
    let mut index: BTreeMap<CellKey, Vec<usize>> = BTreeMap::new();
    for (row, cell) in col.cells.iter().enumerate() {
        index.entry(CellKey::new(cell)).or_default().push(row);
    }
    index
}

fn pair_rows(left: &Column, right: &Column, how: JoinKind) -> Vec<Pairing> {
    let mut pairs: Vec<Pairing> = Vec::new();
    match how {
        JoinKind::Right => {
            let by_key = index_by_key(left);
            for (r, cell) in right.cells.iter().enumerate() {
                match by_key.get(&CellKey::new(cell)) {
                    Some(rows) => pairs.extend(rows.iter().map(|&l| (Some(l), Some(r)))),
                    None => pairs.push((None, Some(r))),
                }
            }
        }
        JoinKind::Inner | JoinKind::Left | JoinKind::Outer => {
            let by_key = index_by_key(right);
            let mut matched = vec![false; right.len()];
            for (l, cell) in left.cells.iter().enumerate() {
                match by_key.get(&CellKey::new(cell)) {
                    Some(rows) => {
                        for &r in rows {
                            matched[r] = true;
                            pairs.push((Some(l), Some(r)));
                        }
                    }
                    None if how != JoinKind::Inner => pairs.push((Some(l), None)),
                    None => {}
                }
            }
            if how == JoinKind::Outer {
                pairs.extend(
                    matched
                        .iter()
                        .enumerate()
                        .filter(|(_, m)| !**m)
                        .map(|(r, _)| (None, Some(r))),
                );
                pairs.sort_by_cached_key(|&(l, r)| match (l, r) {
                    (Some(l), _) => CellKey::new(&left.cells[l]),
                    (None, Some(r)) => CellKey::new(&right.cells[r]),
                    (None, None) => CellKey::new(&Cell::Null),
                });
            }
        }
    }
    pairs
}

fn gather(col: &Column, rows: impl Iterator<Item = Option<usize>>) -> Vec<Cell> {
    rows.map(|r| r.map_or(Cell::Null, |r| col.cells[r].clone()))
        .collect()
}

pub(crate) fn merge(left: &Table, right: &Table, p: &MergeParams) -> Result<Table, PlanError> {
    let (Some(left_key), Some(right_key)) = (left.column(&p.on), right.column(&p.on)) else {
        return Err(PlanError::ColumnNotFound(vec![format!(
            "{} (join column must exist in both tables)",
            p.on
        )]));
    };
    let pairs = pair_rows(left_key, right_key, p.how);
    tracing::debug!(on = %p.on, how = %p.how, rows = pairs.len(), "merged tables");

    let mut out: Vec<Column> = Vec::with_capacity(left.column_count() + right.column_count());
    for col in left.columns() {
        if col.name == p.on {
            let cells = pairs
                .iter()
                .map(|&(l, r)| match (l, r) {
                    (Some(l), _) => left_key.cells[l].clone(),
                    (None, Some(r)) => right_key.cells[r].clone(),
                    (None, None) => Cell::Null,
                })
                .collect();
            out.push(Column::new(col.name.clone(), cells));
            continue;
        }
        let name = if right.has_column(&col.name) {
            format!("{}_x", col.name)
        } else {
            col.name.clone()
        };
        out.push(Column::new(name, gather(col, pairs.iter().map(|pair| pair.0))));
    }
    for col in right.columns().iter().filter(|c| c.name != p.on) {
        let name = if left.has_column(&col.name) {
            format!("{}_y", col.name)
        } else {
            col.name.clone()
        };
        out.push(Column::new(name, gather(col, pairs.iter().map(|pair| pair.1))));
    }
    Ok(Table::new(out)?)
}
