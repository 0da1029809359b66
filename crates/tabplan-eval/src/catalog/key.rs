//! Ordered cell keys for grouping and joining.

use std::cmp::Ordering;
use tabplan_types::Cell;

/// A cell usable as a map key.
///
/// Whole floats are normalized to ints so `1` and `1.0` compare equal; `NaN`
/// is normalized to `Null`. Ordering follows [`Cell::total_cmp`], so `Null`
/// sorts last.
#[derive(Debug, Clone)]
pub(crate) struct CellKey(Cell);

impl CellKey {
    pub(crate) fn new(cell: &Cell) -> Self {
        let normalized = match cell {
            Cell::Float(f) if f.is_nan() => Cell::Null,
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
            other => other.clone(),
        };
        Self(normalized)
    }

    pub(crate) fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellKey {}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
