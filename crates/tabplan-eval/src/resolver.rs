//! Input resolution: turn a step's binding names into values.

use crate::catalog::Step;
use crate::env::Environment;
use std::sync::Arc;
use tabplan_types::{Operation, PlanError, Table, Value};

/// The resolved inputs of one step.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// The value named by `input_data_key`.
    pub primary: Option<Value>,
    /// The right-hand table of a merge.
    pub right: Option<Arc<Table>>,
}

impl Inputs {
    /// The primary input, which must be a table.
    pub fn table(&self) -> Result<&Table, PlanError> {
        match &self.primary {
            Some(Value::Table(t)) => Ok(t.as_ref()),
            _ => Err(PlanError::invalid("operation requires an input table")),
        }
    }

    /// The primary input of either kind.
    pub fn value(&self) -> Result<&Value, PlanError> {
        self.primary
            .as_ref()
            .ok_or_else(|| PlanError::invalid("operation requires an input value"))
    }

    pub fn right(&self) -> Result<&Table, PlanError> {
        self.right
            .as_deref()
            .ok_or_else(|| PlanError::invalid("merge requires a right-hand table"))
    }
}

fn input_name<'o>(op: &'o Operation, step: &Step) -> Result<&'o str, PlanError> {
    op.input.as_deref().ok_or_else(|| {
        PlanError::invalid(format!("{} requires an 'input_data_key'", step.kind()))
    })
}

/// Resolve the bindings a step reads.
///
/// `load-table` reads nothing. `display` accepts a value of either kind.
/// `merge` also resolves its right-hand table. Every other step reads one
/// table.
pub fn resolve(op: &Operation, step: &Step, env: &Environment) -> Result<Inputs, PlanError> {
    match step {
        Step::LoadTable(_) => Ok(Inputs::default()),
        Step::Display(_) => Ok(Inputs {
            primary: Some(env.lookup_any(input_name(op, step)?)?),
            right: None,
        }),
        Step::Merge(p) => {
            let left = env.lookup_table(input_name(op, step)?)?;
            let right = env.lookup_table(&p.right)?;
            Ok(Inputs {
                primary: Some(Value::Table(left)),
                right: Some(right),
            })
        }
        _ => Ok(Inputs {
            primary: Some(Value::Table(env.lookup_table(input_name(op, step)?)?)),
            right: None,
        }),
    }
}
