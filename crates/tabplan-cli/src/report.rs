//! Result envelope and the text run report.

use serde_json::{json, Value as JsonValue};
use tabplan_eval::PlanOutput;
use tabplan_types::{Plan, RunError};

pub fn success(output: &PlanOutput) -> JsonValue {
    json!({
        "status": "success",
        "message": "Plan executed successfully.",
        "processed_data": output.to_json(),
    })
}

pub fn failure(err: &RunError) -> JsonValue {
    json!({
        "status": "error",
        "message": format!("Execution failed: {err}"),
    })
}

/// Plain-text report of one run.
pub fn render(plan: Option<&Plan>, transcript: &[String], envelope: &JsonValue) -> String {
    let mut out = String::new();
    if let Some(plan) = plan {
        out.push_str(&format!("Plan fingerprint: {}\n\n", plan.fingerprint()));
        out.push_str("--- Generated Plan ---\n");
        out.push_str(&pretty(&plan.to_json()));
        out.push_str("\n\n");
    }
    out.push_str("--- Execution Transcript ---\n");
    for line in transcript {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("\n--- Final Result ---\n");
    out.push_str(&pretty(envelope));
    out.push('\n');
    out
}

pub fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
