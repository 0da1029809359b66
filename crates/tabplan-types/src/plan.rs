//! Plan model: a linear sequence of operations.
//!
//! The wire form is the JSON document produced by a plan generator:
//!
//! ```json
//! { "operations": [
//!     { "operation_type": "read_csv", "output_data_key": "sales",
//!       "parameters": { "filepath": "sales.csv" } }
//! ] }
//! ```
//!
//! Operation kinds are resolved when the plan is parsed. Parameter bags are
//! kept as JSON and validated when the step is dispatched.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::fmt;

/// The closed set of operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "read_csv", alias = "load-table")]
    LoadTable,
    #[serde(rename = "calculate_sum", alias = "sum")]
    Sum,
    #[serde(rename = "calculate_average", alias = "average")]
    Average,
    #[serde(rename = "filter_rows", alias = "filter")]
    Filter,
    #[serde(rename = "sort_column", alias = "sort")]
    Sort,
    #[serde(rename = "group_and_aggregate", alias = "group-and-aggregate")]
    GroupAggregate,
    #[serde(rename = "drop_columns", alias = "drop-columns")]
    DropColumns,
    #[serde(rename = "rename_column", alias = "rename-column")]
    RenameColumn,
    #[serde(rename = "merge_dataframes", alias = "merge")]
    Merge,
    #[serde(rename = "display_data", alias = "display")]
    Display,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::LoadTable,
        Self::Sum,
        Self::Average,
        Self::Filter,
        Self::Sort,
        Self::GroupAggregate,
        Self::DropColumns,
        Self::RenameColumn,
        Self::Merge,
        Self::Display,
    ];

    /// Catalog name, e.g. `load-table`.
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadTable => "load-table",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::GroupAggregate => "group-and-aggregate",
            Self::DropColumns => "drop-columns",
            Self::RenameColumn => "rename-column",
            Self::Merge => "merge",
            Self::Display => "display",
        }
    }

    /// Name used in plan documents, e.g. `read_csv`.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::LoadTable => "read_csv",
            Self::Sum => "calculate_sum",
            Self::Average => "calculate_average",
            Self::Filter => "filter_rows",
            Self::Sort => "sort_column",
            Self::GroupAggregate => "group_and_aggregate",
            Self::DropColumns => "drop_columns",
            Self::RenameColumn => "rename_column",
            Self::Merge => "merge_dataframes",
            Self::Display => "display_data",
        }
    }

    /// Resolve either a wire name or a catalog name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.wire_name() == name || k.name() == name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One plan step.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Binding read by the step (the left table for merges).
    pub input: Option<String>,
    /// Binding written by the step.
    pub output: Option<String>,
    /// Kind-specific parameters, validated at dispatch.
    pub params: Map<String, JsonValue>,
    /// Free-form note; not load-bearing.
    pub description: Option<String>,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            input: None,
            output: None,
            params: Map::new(),
            description: None,
        }
    }

    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.input = Some(name.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description for trace output, falling back to `Step N: kind`.
    pub fn label(&self, index: usize) -> String {
        match &self.description {
            Some(d) if !d.trim().is_empty() => d.clone(),
            _ => format!("Step {}: {}", index + 1, self.kind),
        }
    }

    fn to_raw(&self) -> RawOperation {
        RawOperation {
            operation_type: self.kind.wire_name().to_string(),
            input_data_key: self.input.clone(),
            output_data_key: self.output.clone(),
            parameters: self.params.clone(),
            description: self.description.clone(),
        }
    }
}

/// An ordered sequence of operations, executed exactly in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub operations: Vec<Operation>,
}

impl Plan {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Parse a plan document.
    ///
    /// A missing `operations` array yields an empty plan; the engine rejects
    /// it at run time.
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let raw: RawPlan =
            serde_json::from_str(text).map_err(|e| PlanError::MalformedPlan(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Parse a plan from an already-decoded JSON value.
    pub fn from_value(value: JsonValue) -> Result<Self, PlanError> {
        let raw: RawPlan =
            serde_json::from_value(value).map_err(|e| PlanError::MalformedPlan(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawPlan) -> Result<Self, PlanError> {
        let operations = raw
            .operations
            .into_iter()
            .enumerate()
            .map(|(index, op)| {
                let kind = OperationKind::from_name(&op.operation_type).ok_or_else(|| {
                    PlanError::UnknownOperationKind {
                        index,
                        name: op.operation_type.clone(),
                    }
                })?;
                Ok(Operation {
                    kind,
                    input: op.input_data_key.filter(|s| !s.is_empty()),
                    output: op.output_data_key.filter(|s| !s.is_empty()),
                    params: op.parameters,
                    description: op.description,
                })
            })
            .collect::<Result<Vec<_>, PlanError>>()?;
        Ok(Self { operations })
    }

    /// Wire-form JSON of the plan.
    pub fn to_json(&self) -> JsonValue {
        let raw = RawPlan {
            operations: self.operations.iter().map(Operation::to_raw).collect(),
        };
        // RawPlan only holds strings and JSON values; serialization cannot fail.
        serde_json::to_value(raw).unwrap_or(JsonValue::Null)
    }

    /// SHA-256 of the compact wire form, as lowercase hex.
    pub fn fingerprint(&self) -> String {
        let bytes = self.to_json().to_string();
        let digest = Sha256::digest(bytes.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawPlan {
    #[serde(default)]
    operations: Vec<RawOperation>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawOperation {
    operation_type: String,
    #[serde(default)]
    input_data_key: Option<String>,
    #[serde(default)]
    output_data_key: Option<String>,
    #[serde(default)]
    parameters: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_wire_names_and_aliases() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.wire_name()), Some(kind));
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(OperationKind::from_name("write_output"), None);
    }

    #[test]
    fn parse_plan_document() {
        let plan = Plan::from_json(
            r#"{"operations":[
                {"operation_type":"read_csv","output_data_key":"raw","parameters":{"filepath":"a.csv"}},
                {"operation_type":"display_data","input_data_key":"raw","output_data_key":null,"parameters":{}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.operations[0].kind, OperationKind::LoadTable);
        assert_eq!(plan.operations[0].output.as_deref(), Some("raw"));
        assert_eq!(plan.operations[1].input.as_deref(), Some("raw"));
        assert_eq!(plan.operations[1].output, None);
    }

    #[test]
    fn missing_operations_is_empty_plan() {
        let plan = Plan::from_json("{}").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn unknown_kind_rejected_at_parse() {
        let err = Plan::from_json(
            r#"{"operations":[{"operation_type":"write_output","parameters":{}}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperationKind);
    }

    #[test]
    fn malformed_document_rejected() {
        let err = Plan::from_json(r#"{"operations": 3}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPlan);
    }

    #[test]
    fn parameters_default_to_empty() {
        let plan =
            Plan::from_json(r#"{"operations":[{"operation_type":"display_data"}]}"#).unwrap();
        assert!(plan.operations[0].params.is_empty());
    }

    #[test]
    fn fingerprint_is_stable() {
        let plan = Plan::new(vec![Operation::new(OperationKind::LoadTable)
            .output("s")
            .param("filepath", "sales.csv")]);
        let again = Plan::from_value(plan.to_json()).unwrap();
        assert_eq!(plan, again);
        assert_eq!(plan.fingerprint(), again.fingerprint());
        assert_eq!(plan.fingerprint().len(), 64);
    }

    #[test]
    fn label_falls_back_to_kind() {
        let op = Operation::new(OperationKind::Sort);
        assert_eq!(op.label(2), "Step 3: sort");
        assert_eq!(op.describe("Sort it").label(2), "Sort it");
    }
}
