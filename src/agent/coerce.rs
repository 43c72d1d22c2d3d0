//! Text coercion of agent values.
//!
//! Mappings and sequences render as indented JSON with non-ASCII preserved,
//! strings render as themselves, other scalars use their JSON text.

use serde_json::Value;

use super::result::AgentResult;

/// Render a JSON value as human-readable text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Pretty JSON rendering failed, using debug form");
                format!("{value:?}")
            })
        }
        other => other.to_string(),
    }
}

/// The result's own string form, if it has one.
///
/// Lists and producers have no string form of their own; callers fall back
/// to a placeholder.
pub fn result_to_text(result: &AgentResult) -> Option<String> {
    match result {
        AgentResult::PlainText(text) => Some(text.clone()),
        AgentResult::FieldBag(bag) => bag.display().map(str::to_string),
        AgentResult::NestedList(_) | AgentResult::Producer(_) => None,
    }
}

/// Truthiness of an agent value: null, zero and empty strings/collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
    }
}
