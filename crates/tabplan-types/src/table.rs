//! Column-oriented tables.

use crate::cell::{Cell, ColumnType};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors returned when building a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A column's length differs from the first column's.
    #[error("column '{column}' has {found} cells, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    /// A row's width differs from the header's.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Type inferred from the non-null cells.
    pub fn inferred_type(&self) -> ColumnType {
        ColumnType::infer(&self.cells)
    }

    pub fn is_numeric(&self) -> bool {
        self.inferred_type().is_numeric()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An immutable, ordered collection of equal-length named columns.
///
/// Column names are unique. Row order is significant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from columns, checking names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for (i, col) in columns.iter().enumerate() {
                if col.len() != expected {
                    return Err(TableError::RaggedColumn {
                        column: col.name.clone(),
                        expected,
                        found: col.len(),
                    });
                }
                if columns[..i].iter().any(|c| c.name == col.name) {
                    return Err(TableError::DuplicateColumn(col.name.clone()));
                }
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a header and row-major cells.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let width = names.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|n| Column::new(n, Vec::with_capacity(rows.len())))
            .collect();
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TableError::RaggedRow {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.cells.push(cell);
            }
        }
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `names` that are not columns of this table, in input order.
    pub fn missing_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        names
            .into_iter()
            .filter(|n| !self.has_column(n))
            .map(str::to_string)
            .collect()
    }

    /// A new table holding the given rows, in the given order.
    ///
    /// Indices must be in range.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                cells: indices.iter().map(|&i| c.cells[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.row_count());
        let indices: Vec<usize> = (0..n).collect();
        self.take_rows(&indices)
    }

    /// Row-records: one ordered JSON object per row, keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, JsonValue>> {
        (0..self.row_count())
            .map(|r| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.cells[r].to_json()))
                    .collect()
            })
            .collect()
    }

    /// Row-records as a JSON array.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.to_records()
                .into_iter()
                .map(JsonValue::Object)
                .collect(),
        )
    }

    /// Render as an aligned text grid with a leading row-index column.
    pub fn render(&self) -> String {
        let rows = self.row_count();
        let index_width = rows.saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                c.cells
                    .iter()
                    .map(|cell| cell.to_string().chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (col, w) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>w$}", col.name, w = *w));
        }
        for r in 0..rows {
            out.push('\n');
            out.push_str(&format!("{r:<index_width$}"));
            for (col, w) in self.columns.iter().zip(&widths) {
                out.push_str(&format!("  {:>w$}", col.cells[r].to_string(), w = *w));
            }
        }
        out
    }
}
