//! Final-result selection for a completed run.

use crate::env::Environment;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tabplan_types::{Table, Value};

/// Message carried by the "no output" sentinel.
pub const NO_OUTPUT_MESSAGE: &str = "No significant output to return.";

/// The caller-facing output of a completed run.
///
/// Chosen by precedence: the last unlabeled result, else every scalar
/// binding, else the most recently bound table, else [`PlanOutput::Nothing`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutput {
    /// Result of the last step that had no output name.
    Unlabeled(Value),
    /// Every non-table binding, in bind order.
    Scalars(Vec<(String, Value)>),
    /// The table bound most recently.
    LatestTable { name: String, table: Arc<Table> },
    /// Nothing worth returning.
    Nothing,
}

impl PlanOutput {
    /// Canonical JSON form. Tables become row-records.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Unlabeled(v) => v.to_json(),
            Self::Scalars(items) => {
                let map: Map<String, JsonValue> = items
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json()))
                    .collect();
                JsonValue::Object(map)
            }
            Self::LatestTable { table, .. } => table.to_json(),
            Self::Nothing => json!({ "message": NO_OUTPUT_MESSAGE }),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

/// Pick the output of a completed run.
pub fn reduce(last_unlabeled: Option<&Value>, env: &Environment) -> PlanOutput {
    if let Some(v) = last_unlabeled {
        return PlanOutput::Unlabeled(v.clone());
    }
    let scalars = env.scalars();
    if !scalars.is_empty() {
        return PlanOutput::Scalars(
            scalars
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        );
    }
    match env.latest_table() {
        Some((name, table)) => PlanOutput::LatestTable {
            name: name.to_string(),
            table: Arc::clone(table),
        },
        None => PlanOutput::Nothing,
    }
}
