//! Text rendering for `display` steps.

use super::params::DisplayParams;
use crate::options::EngineOptions;
use serde_json::Value as JsonValue;
use tabplan_types::Value;

/// Human-readable rendering of a value under a label banner.
///
/// Tables longer than the preview threshold show only their first rows.
pub(crate) fn render(value: &Value, p: &DisplayParams, options: &EngineOptions) -> String {
    let body = match value {
        Value::Table(t) if t.row_count() > options.preview_threshold => format!(
            "{}\n...\n(Showing top {} rows, data truncated for display)\n...",
            t.head(options.preview_rows).render(),
            options.preview_rows
        ),
        Value::Table(t) => t.render(),
        Value::Scalar(JsonValue::String(s)) => s.clone(),
        Value::Scalar(v) => v.to_string(),
    };
    format!("--- {} ---\n{body}\n-----------------", p.label)
}
