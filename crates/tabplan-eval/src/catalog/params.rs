//! Typed parameters for each operation kind.
//!
//! Parameter bags arrive as JSON objects. [`Step::decode`] turns a bag into
//! the strongly typed variant for its kind, rejecting missing or
//! out-of-domain fields with [`PlanError::InvalidParameter`]. Unknown fields
//! are ignored.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use tabplan_types::{Operation, OperationKind, PlanError};

// ══════════════════════════════════════════════════════════════════════════════
// Domain enums
// ══════════════════════════════════════════════════════════════════════════════

/// Filter comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim() {
            "==" | "=" => Self::Eq,
            "!=" | "<>" | "≠" => Self::Ne,
            "<" => Self::Lt,
            "<=" | "≤" => Self::Le,
            ">" => Self::Gt,
            ">=" | "≥" => Self::Ge,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// Aggregation function for group-and-aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl AggFunc {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "sum" => Self::Sum,
            "mean" => Self::Mean,
            "count" => Self::Count,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Join kind for merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "inner"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Outer => write!(f, "outer"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Parameter structs
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct LoadParams {
    pub filepath: String,
}

/// Parameters of `sum` and `average`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnParams {
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub column: String,
    pub op: CompareOp,
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortParams {
    pub column: String,
    pub order: SortOrder,
}

/// One aggregation output column.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub column: String,
    pub func: AggFunc,
    /// Explicit `output_column_name`, or `<column>_<function>`.
    pub output: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupParams {
    pub by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropParams {
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameParams {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeParams {
    /// Binding holding the right-hand table.
    pub right: String,
    pub on: String,
    pub how: JoinKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayParams {
    pub label: String,
}

/// A decoded step: one variant per operation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    LoadTable(LoadParams),
    Sum(ColumnParams),
    Average(ColumnParams),
    Filter(FilterParams),
    Sort(SortParams),
    GroupAggregate(GroupParams),
    DropColumns(DropParams),
    RenameColumn(RenameParams),
    Merge(MergeParams),
    Display(DisplayParams),
}

// ══════════════════════════════════════════════════════════════════════════════
// Wire shapes
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct RawLoad {
    filepath: String,
}

#[derive(Deserialize)]
struct RawColumn {
    column: String,
}

#[derive(Deserialize)]
struct RawFilter {
    column: String,
    value: JsonValue,
    #[serde(default)]
    operator: Option<String>,
}

#[derive(Deserialize)]
struct RawSort {
    column: String,
    #[serde(default)]
    order: Option<String>,
}

#[derive(Deserialize)]
struct RawAggregation {
    column: String,
    function: String,
    #[serde(default)]
    output_column_name: Option<String>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    by_columns: Vec<String>,
    #[serde(default)]
    aggregations: Vec<RawAggregation>,
}

#[derive(Deserialize)]
struct RawDrop {
    #[serde(default)]
    columns_to_drop: Vec<String>,
}

#[derive(Deserialize)]
struct RawRename {
    #[serde(default)]
    old_name: String,
    #[serde(default)]
    new_name: String,
}

#[derive(Deserialize)]
struct RawMerge {
    #[serde(default)]
    right_data_key: String,
    #[serde(default)]
    on_column: String,
    #[serde(default)]
    how: Option<String>,
}

#[derive(Deserialize)]
struct RawDisplay {
    #[serde(default)]
    label: JsonValue,
}

fn bag<T: DeserializeOwned>(kind: OperationKind, params: &Map<String, JsonValue>) -> Result<T, PlanError> {
    serde_json::from_value(JsonValue::Object(params.clone()))
        .map_err(|e| PlanError::invalid(format!("{kind}: {e}")))
}

fn required(kind: OperationKind, field: &str, value: String) -> Result<String, PlanError> {
    if value.trim().is_empty() {
        Err(PlanError::invalid(format!("{kind}: no '{field}' provided")))
    } else {
        Ok(value)
    }
}

impl Step {
    /// Decode and validate an operation's parameter bag.
    pub fn decode(op: &Operation) -> Result<Self, PlanError> {
        let kind = op.kind;
        let params = &op.params;
        Ok(match kind {
            OperationKind::LoadTable => {
                let raw: RawLoad = bag(kind, params)?;
                Step::LoadTable(LoadParams {
                    filepath: required(kind, "filepath", raw.filepath)?,
                })
            }
            OperationKind::Sum | OperationKind::Average => {
                let raw: RawColumn = bag(kind, params)?;
                let p = ColumnParams {
                    column: required(kind, "column", raw.column)?,
                };
                if kind == OperationKind::Sum {
                    Step::Sum(p)
                } else {
                    Step::Average(p)
                }
            }
            OperationKind::Filter => {
                let raw: RawFilter = bag(kind, params)?;
                let operator = raw.operator.unwrap_or_else(|| "==".to_string());
                let op = CompareOp::parse(&operator).ok_or_else(|| {
                    PlanError::invalid(format!("unsupported filter operator: {operator}"))
                })?;
                Step::Filter(FilterParams {
                    column: required(kind, "column", raw.column)?,
                    op,
                    value: raw.value,
                })
            }
            OperationKind::Sort => {
                let raw: RawSort = bag(kind, params)?;
                let order = match raw.order.as_deref().unwrap_or("ascending") {
                    "ascending" => SortOrder::Ascending,
                    "descending" => SortOrder::Descending,
                    other => {
                        return Err(PlanError::invalid(format!(
                            "unsupported sort order: {other}. Use 'ascending' or 'descending'"
                        )))
                    }
                };
                Step::Sort(SortParams {
                    column: required(kind, "column", raw.column)?,
                    order,
                })
            }
            OperationKind::GroupAggregate => {
                let raw: RawGroup = bag(kind, params)?;
                if raw.by_columns.is_empty() {
                    return Err(PlanError::invalid(format!("{kind}: no 'by_columns' provided")));
                }
                if raw.aggregations.is_empty() {
                    return Err(PlanError::invalid(format!(
                        "{kind}: no 'aggregations' provided"
                    )));
                }
                let aggregations = raw
                    .aggregations
                    .into_iter()
                    .map(|a| {
                        let func = AggFunc::parse(&a.function).ok_or_else(|| {
                            PlanError::invalid(format!(
                                "unsupported aggregation function: {}. Use 'sum', 'mean', 'count', 'min', 'max'",
                                a.function
                            ))
                        })?;
                        let output = a
                            .output_column_name
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| format!("{}_{}", a.column, func.name()));
                        Ok(Aggregation {
                            column: a.column,
                            func,
                            output,
                        })
                    })
                    .collect::<Result<Vec<_>, PlanError>>()?;
                Step::GroupAggregate(GroupParams {
                    by: raw.by_columns,
                    aggregations,
                })
            }
            OperationKind::DropColumns => {
                let raw: RawDrop = bag(kind, params)?;
                if raw.columns_to_drop.is_empty() {
                    return Err(PlanError::invalid(format!(
                        "{kind}: no 'columns_to_drop' provided"
                    )));
                }
                Step::DropColumns(DropParams {
                    columns: raw.columns_to_drop,
                })
            }
            OperationKind::RenameColumn => {
                let raw: RawRename = bag(kind, params)?;
                if raw.old_name.is_empty() || raw.new_name.is_empty() {
                    return Err(PlanError::invalid(
                        "both 'old_name' and 'new_name' must be provided for rename-column",
                    ));
                }
                Step::RenameColumn(RenameParams {
                    old_name: raw.old_name,
                    new_name: raw.new_name,
                })
            }
            OperationKind::Merge => {
                let raw: RawMerge = bag(kind, params)?;
                let right = required(kind, "right_data_key", raw.right_data_key)?;
                let on = required(kind, "on_column", raw.on_column)?;
                let how = match raw.how.as_deref().unwrap_or("inner") {
                    "inner" => JoinKind::Inner,
                    "left" => JoinKind::Left,
                    "right" => JoinKind::Right,
                    "outer" => JoinKind::Outer,
                    other => {
                        return Err(PlanError::invalid(format!(
                            "unsupported merge 'how' type: {other}. Use 'inner', 'left', 'right', 'outer'"
                        )))
                    }
                };
                Step::Merge(MergeParams { right, on, how })
            }
            OperationKind::Display => {
                let raw: RawDisplay = bag(kind, params)?;
                let label = match raw.label {
                    JsonValue::Null => String::new(),
                    JsonValue::String(s) => s,
                    other => other.to_string(),
                };
                Step::Display(DisplayParams {
                    label: if label.is_empty() { "Result".to_string() } else { label },
                })
            }
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::LoadTable(_) => OperationKind::LoadTable,
            Self::Sum(_) => OperationKind::Sum,
            Self::Average(_) => OperationKind::Average,
            Self::Filter(_) => OperationKind::Filter,
            Self::Sort(_) => OperationKind::Sort,
            Self::GroupAggregate(_) => OperationKind::GroupAggregate,
            Self::DropColumns(_) => OperationKind::DropColumns,
            Self::RenameColumn(_) => OperationKind::RenameColumn,
            Self::Merge(_) => OperationKind::Merge,
            Self::Display(_) => OperationKind::Display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabplan_types::ErrorKind;

    fn decode(kind: OperationKind, params: JsonValue) -> Result<Step, PlanError> {
        let mut op = Operation::new(kind);
        op.params = params.as_object().cloned().unwrap_or_default();
        Step::decode(&op)
    }

    #[test]
    fn missing_required_field() {
        let err = decode(OperationKind::Sum, json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("column"));
    }

    #[test]
    fn extra_fields_ignored() {
        let step = decode(OperationKind::Sum, json!({"column": "x", "note": 1})).unwrap();
        assert_eq!(step, Step::Sum(ColumnParams { column: "x".into() }));
    }

    #[test]
    fn filter_defaults_to_equality() {
        let Step::Filter(p) = decode(OperationKind::Filter, json!({"column": "x", "value": 3})).unwrap()
        else {
            panic!("expected filter");
        };
        assert_eq!(p.op, CompareOp::Eq);
    }

    #[test]
    fn filter_accepts_symbol_spellings() {
        for (s, op) in [("≠", CompareOp::Ne), ("<>", CompareOp::Ne), ("≤", CompareOp::Le), ("=", CompareOp::Eq)] {
            assert_eq!(CompareOp::parse(s), Some(op));
        }
    }

    #[test]
    fn unsupported_comparator() {
        let err = decode(
            OperationKind::Filter,
            json!({"column": "x", "value": 3, "operator": "~"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn unsupported_sort_order() {
        let err = decode(OperationKind::Sort, json!({"column": "x", "order": "up"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn aggregation_default_output_name() {
        let Step::GroupAggregate(p) = decode(
            OperationKind::GroupAggregate,
            json!({"by_columns": ["c"], "aggregations": [{"column": "amount", "function": "sum"}]}),
        )
        .unwrap() else {
            panic!("expected group");
        };
        assert_eq!(p.aggregations[0].output, "amount_sum");
    }

    #[test]
    fn unsupported_aggregation_function() {
        let err = decode(
            OperationKind::GroupAggregate,
            json!({"by_columns": ["c"], "aggregations": [{"column": "a", "function": "median"}]}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn group_requires_keys_and_aggregations() {
        let err = decode(OperationKind::GroupAggregate, json!({"aggregations": []})).unwrap_err();
        assert!(err.to_string().contains("by_columns"));
    }

    #[test]
    fn unsupported_join_kind() {
        let err = decode(
            OperationKind::Merge,
            json!({"right_data_key": "r", "on_column": "k", "how": "cross"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn display_label_default() {
        assert_eq!(
            decode(OperationKind::Display, json!({})).unwrap(),
            Step::Display(DisplayParams { label: "Result".into() })
        );
    }

    #[test]
    fn display_label_of_any_type_is_text() {
        assert_eq!(
            decode(OperationKind::Display, json!({"label": 5})).unwrap(),
            Step::Display(DisplayParams { label: "5".into() })
        );
        assert_eq!(
            decode(OperationKind::Display, json!({"label": null})).unwrap(),
            Step::Display(DisplayParams { label: "Result".into() })
        );
    }

    #[test]
    fn rename_requires_both_names() {
        let err = decode(OperationKind::RenameColumn, json!({"old_name": "a"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}
