//! Binding environment for a single plan run.

use std::collections::BTreeMap;
use std::sync::Arc;
use tabplan_types::{PlanError, Table, Value, ValueKind};

/// A stored value with its bind sequence number.
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    seq: u64,
}

/// Name → value bindings for one plan run.
///
/// A single map holds both tables and scalars; each name lives in exactly
/// one conceptual sub-store, decided by its value's kind. Rebinding a name
/// overwrites it (last write wins) and makes it the most recent binding.
/// Nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: BTreeMap<String, Binding>,
    next_seq: u64,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a binding.
    pub fn bind(&mut self, name: &str, value: Value) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.bindings.insert(name.to_string(), Binding { value, seq });
    }

    /// Look up a value of either kind.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Look up a binding that must hold a table.
    pub fn lookup_table(&self, name: &str) -> Result<Arc<Table>, PlanError> {
        match self.get(name) {
            Some(Value::Table(t)) => Ok(Arc::clone(t)),
            Some(other) => Err(PlanError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Table,
                found: other.kind(),
            }),
            None => Err(PlanError::BindingNotFound(name.to_string())),
        }
    }

    /// Look up a binding of any kind.
    pub fn lookup_any(&self, name: &str) -> Result<Value, PlanError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| PlanError::BindingNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings of one kind, in bind order.
    pub fn of_kind(&self, kind: ValueKind) -> Vec<(&str, &Value)> {
        let mut out: Vec<(&str, &Binding)> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.value.kind() == kind)
            .map(|(n, b)| (n.as_str(), b))
            .collect();
        out.sort_by_key(|(_, b)| b.seq);
        out.into_iter().map(|(n, b)| (n, &b.value)).collect()
    }

    /// Non-table bindings, in bind order.
    pub fn scalars(&self) -> Vec<(&str, &Value)> {
        self.of_kind(ValueKind::Scalar)
    }

    /// The table bound most recently, with its name.
    pub fn latest_table(&self) -> Option<(&str, &Arc<Table>)> {
        self.bindings
            .iter()
            .filter_map(|(n, b)| b.value.as_table().map(|t| (n.as_str(), t, b.seq)))
            .max_by_key(|(_, _, seq)| *seq)
            .map(|(n, t, _)| (n, t))
    }
}
