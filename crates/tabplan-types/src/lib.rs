//! Shared types for tabplan.
//!
//! This crate defines the value model (cells, tables, values), the plan
//! model (operations and their kinds) and the error taxonomy used by the
//! execution engine and its callers.

mod cell;
mod error;
mod plan;
mod table;
mod value;

pub use cell::{Cell, ColumnType};
pub use error::{ErrorKind, PlanError, RunError, StepError};
pub use plan::{Operation, OperationKind, Plan};
pub use table::{Column, Table, TableError};
pub use value::{Value, ValueKind};

/// Result type used throughout tabplan.
pub type Result<T> = std::result::Result<T, PlanError>;
