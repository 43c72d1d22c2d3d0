//! Result Extractor: reduce any agent result to one canonical text.
//!
//! Probes run in a fixed order and the first hit wins:
//! 1. first element of `tasks_output` (probed with steps 2-5 in its own scope)
//! 2. named fields
//! 3. attribute map, same key order
//! 4. producer methods
//! 5. the value's own string form
//!
//! Nothing here returns an error; a total miss yields the placeholder.

use crate::agent::{result_to_text, value_to_text, AgentResult};
use crate::config::{log_preview, UNEXTRACTABLE_PLACEHOLDER};

/// Field names probed on a top-level result.
const RESULT_FIELDS: &[&str] = &[
    "output", "text", "content", "result", "response", "message", "answer", "json_dict",
];

/// Field names probed on a task output element.
const TASK_FIELDS: &[&str] = &[
    "output", "text", "content", "result", "response", "message", "answer", "body",
];

/// Zero-argument producer methods, in probe order.
const PRODUCER_METHODS: &[&str] = &["to_dict", "dict", "as_dict", "json"];

/// Extract plain text from an agent result. Never fails.
pub fn extract_text(result: &AgentResult) -> String {
    let text = first_task_text(result)
        .or_else(|| probe(result, RESULT_FIELDS))
        .unwrap_or_else(|| {
            tracing::warn!("No text could be extracted from agent result");
            UNEXTRACTABLE_PLACEHOLDER.to_string()
        });
    tracing::debug!(preview = %log_preview(&text), "Extracted agent text");
    text
}

fn first_task_text(result: &AgentResult) -> Option<String> {
    let first = result.tasks_output()?.first()?;
    let text = probe(first, TASK_FIELDS);
    if text.is_none() {
        tracing::debug!("First task output yielded no text, probing the result itself");
    }
    text
}

/// Steps 2-5 against a single value.
fn probe(result: &AgentResult, fields: &[&str]) -> Option<String> {
    named_field(result, fields)
        .or_else(|| attribute_field(result, fields))
        .or_else(|| produced(result))
        .or_else(|| result_to_text(result))
}

fn named_field(result: &AgentResult, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|name| result.field(name))
        .map(value_to_text)
}

fn attribute_field(result: &AgentResult, fields: &[&str]) -> Option<String> {
    let AgentResult::FieldBag(bag) = result else {
        return None;
    };
    if !bag.has_attributes() {
        return None;
    }
    fields
        .iter()
        .find_map(|name| bag.attribute(name))
        .map(value_to_text)
}

fn produced(result: &AgentResult) -> Option<String> {
    let producers: Vec<_> = match result {
        AgentResult::FieldBag(bag) => PRODUCER_METHODS
            .iter()
            .filter_map(|m| bag.producer(m))
            .collect(),
        AgentResult::Producer(p) if PRODUCER_METHODS.contains(&p.method()) => vec![p],
        _ => return None,
    };

    producers.into_iter().find_map(|p| match p.produce() {
        Ok(value) => Some(value_to_text(&value)),
        Err(e) => {
            tracing::debug!(method = p.method(), error = %e, "Producer failed, trying next");
            None
        }
    })
}
