//! Error taxonomy for plan parsing and execution.

use crate::plan::OperationKind;
use crate::table::TableError;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error kinds, independent of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    BindingNotFound,
    TypeMismatch,
    ColumnNotFound,
    InvalidParameter,
    TypeIncompatible,
    SourceUnavailable,
    EmptyPlan,
    UnknownOperationKind,
    MalformedPlan,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A failure raised while parsing a plan or running one of its steps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A referenced input name has no binding.
    #[error("binding '{0}' not found; it must be produced by an earlier step")]
    BindingNotFound(String),

    /// A binding exists but holds the wrong kind of value.
    #[error("binding '{name}' holds a {found}, expected a {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// One or more named columns are absent.
    #[error("column(s) not found: {}", .0.join(", "))]
    ColumnNotFound(Vec<String>),

    /// A required parameter is missing or out of domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Comparison or arithmetic between incompatible types.
    #[error("incompatible types: {0}")]
    TypeIncompatible(String),

    /// The table provider cannot locate or parse the source.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("plan contains no operations")]
    EmptyPlan,

    #[error("unknown operation kind '{name}' at operation {}", .index + 1)]
    UnknownOperationKind { index: usize, name: String },

    /// The plan document is not valid JSON of the expected shape.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BindingNotFound(_) => ErrorKind::BindingNotFound,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::ColumnNotFound(_) => ErrorKind::ColumnNotFound,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::TypeIncompatible(_) => ErrorKind::TypeIncompatible,
            Self::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            Self::EmptyPlan => ErrorKind::EmptyPlan,
            Self::UnknownOperationKind { .. } => ErrorKind::UnknownOperationKind,
            Self::MalformedPlan(_) => ErrorKind::MalformedPlan,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::TypeIncompatible(msg.into())
    }

    pub fn column(name: impl Into<String>) -> Self {
        Self::ColumnNotFound(vec![name.into()])
    }
}

impl From<TableError> for PlanError {
    fn from(err: TableError) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}

/// A step failure with the context needed to report it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("step {} ({kind}) failed: {error}", .index + 1)]
pub struct StepError {
    /// Zero-based position of the step in the plan.
    pub index: usize,
    pub kind: OperationKind,
    pub description: Option<String>,
    #[source]
    pub error: PlanError,
}

/// The single error returned by a failed run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// Rejected before any step ran.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// A step failed; later steps did not run.
    #[error(transparent)]
    Step(#[from] StepError),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Plan(e) => e.kind(),
            Self::Step(s) => s.error.kind(),
        }
    }

    /// Index of the failing step, if a step failed.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::Plan(_) => None,
            Self::Step(s) => Some(s.index),
        }
    }
}
