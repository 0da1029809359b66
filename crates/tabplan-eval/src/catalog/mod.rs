//! The operation catalog.
//!
//! Each routine takes its already-resolved inputs and typed parameters and
//! produces a new value. Routines never touch the environment.

mod columns;
mod display;
mod filter;
mod group;
mod key;
mod merge;
pub mod params;
mod sort;
mod stats;

pub use params::{
    AggFunc, Aggregation, ColumnParams, CompareOp, DisplayParams, DropParams, FilterParams,
    GroupParams, JoinKind, LoadParams, MergeParams, RenameParams, SortOrder, SortParams, Step,
};

use crate::options::EngineOptions;
use crate::resolver::Inputs;
use crate::source::TableSource;
use tabplan_types::{PlanError, Value};

/// What the routines may reach outside their inputs.
pub(crate) struct Context<'a> {
    pub source: &'a dyn TableSource,
    pub options: &'a EngineOptions,
}

/// Result of one routine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    /// A bindable value.
    Value(Value),
    /// A display rendering; never bound, never part of the output.
    Rendered(String),
}

/// Run one decoded step.
pub(crate) fn apply(step: &Step, inputs: &Inputs, ctx: &Context<'_>) -> Result<Outcome, PlanError> {
    let value = match step {
        Step::LoadTable(p) => Value::table(ctx.source.load(&p.filepath)?),
        Step::Sum(p) => stats::sum(inputs.table()?, p)?,
        Step::Average(p) => stats::average(inputs.table()?, p)?,
        Step::Filter(p) => {
            Value::table(filter::filter(inputs.table()?, p, ctx.options.float_tolerance)?)
        }
        Step::Sort(p) => Value::table(sort::sort(inputs.table()?, p)?),
        Step::GroupAggregate(p) => Value::table(group::group_aggregate(inputs.table()?, p)?),
        Step::DropColumns(p) => Value::table(columns::drop_columns(inputs.table()?, p)?),
        Step::RenameColumn(p) => Value::table(columns::rename_column(inputs.table()?, p)?),
        Step::Merge(p) => Value::table(merge::merge(inputs.table()?, inputs.right()?, p)?),
        Step::Display(p) => {
            return Ok(Outcome::Rendered(display::render(
                inputs.value()?,
                p,
                ctx.options,
            )))
        }
    };
    Ok(Outcome::Value(value))
}
