//! Column-shape routines: `drop-columns` and `rename-column`.

use super::params::{DropParams, RenameParams};
use tabplan_types::{Column, PlanError, Table};

/// Remove the named columns. Fails without changes if any is absent.
pub(crate) fn drop_columns(table: &Table, p: &DropParams) -> Result<Table, PlanError> {
    let missing = table.missing_columns(p.columns.iter().map(String::as_str));
    if !missing.is_empty() {
        return Err(PlanError::ColumnNotFound(missing));
    }
    tracing::debug!(columns = ?p.columns, "dropping columns");
    let kept: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| !p.columns.contains(&c.name))
        .cloned()
        .collect();
    Ok(Table::new(kept)?)
}

/// Rename one column in place.
///
/// Another column already called `new_name` is replaced by the renamed one.
pub(crate) fn rename_column(table: &Table, p: &RenameParams) -> Result<Table, PlanError> {
    if !table.has_column(&p.old_name) {
        return Err(PlanError::column(&p.old_name));
    }
    if p.old_name == p.new_name {
        return Ok(table.clone());
    }
    if table.has_column(&p.new_name) {
        tracing::warn!(
            old = %p.old_name,
            new = %p.new_name,
            "rename overwrites an existing column"
        );
    }
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| c.name != p.new_name)
        .map(|c| {
            if c.name == p.old_name {
                Column::new(p.new_name.clone(), c.cells.clone())
            } else {
                c.clone()
            }
        })
        .collect();
    Ok(Table::new(columns)?)
}
