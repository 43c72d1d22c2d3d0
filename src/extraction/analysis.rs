//! Narrower extraction chains used by the voice, body-part and transcription
//! call sites. Each one is total and checks a short list of known locations
//! before falling back to a fixed string.

use serde_json::{Map, Value};

use crate::agent::{is_truthy, result_to_text, value_to_text, AgentResult};
use crate::config::{log_preview, NO_ANALYSIS_PRODUCED, UNEXTRACTABLE_PLACEHOLDER};

/// First truthy value among `keys` in a JSON mapping.
pub(crate) fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k).filter(|v| is_truthy(v)))
}

/// `output`, else `result`, else the element's own string form.
pub(crate) fn task_output_text(task: &AgentResult) -> Option<String> {
    ["output", "result"]
        .iter()
        .find_map(|name| task.field(name).filter(|v| is_truthy(v)))
        .map(value_to_text)
        .or_else(|| result_to_text(task))
}

/// Text of a voice or report analysis. Never fails.
///
/// Order: `json_dict`, then `raw`, then the first task output, then bare
/// text. Falsy values are skipped at each step.
pub fn extract_analysis_text(result: &AgentResult) -> String {
    let text = analysis_from_json_dict(result)
        .or_else(|| analysis_from_raw(result))
        .or_else(|| {
            result
                .tasks_output()
                .and_then(|tasks| tasks.first())
                .and_then(task_output_text)
        })
        .or_else(|| match result {
            AgentResult::PlainText(text) => Some(text.clone()),
            _ => None,
        });

    match text {
        Some(text) => {
            tracing::debug!(preview = %log_preview(&text), "Extracted analysis text");
            text
        }
        None => {
            tracing::warn!("Agent result carried no analysis text");
            NO_ANALYSIS_PRODUCED.to_string()
        }
    }
}

fn analysis_from_json_dict(result: &AgentResult) -> Option<String> {
    let jd = result.field("json_dict").filter(|v| is_truthy(v))?;
    match jd {
        Value::Object(map) => Some(
            first_truthy(map, &["final_output", "result"])
                .map(value_to_text)
                .unwrap_or_else(|| value_to_text(jd)),
        ),
        other => Some(value_to_text(other)),
    }
}

fn analysis_from_raw(result: &AgentResult) -> Option<String> {
    let raw = result.field("raw").filter(|v| is_truthy(v))?;
    match raw {
        Value::Object(map) => Some(
            first_truthy(map, &["output_text", "text"])
                .map(value_to_text)
                .unwrap_or_else(|| value_to_text(raw)),
        ),
        other => Some(value_to_text(other)),
    }
}

/// Body part named by an identification agent, trimmed.
pub fn extract_body_part(result: &AgentResult) -> String {
    let text = match (result.field("raw"), result.field("json_dict")) {
        (Some(Value::Object(raw)), _) => raw
            .get("output_text")
            .map(value_to_text)
            .unwrap_or_default(),
        (_, Some(jd)) => value_to_text(jd),
        _ => result_to_text(result).unwrap_or_else(|| UNEXTRACTABLE_PLACEHOLDER.to_string()),
    };
    text.trim().to_string()
}

/// Transcript text from a transcription response; empty when none is found.
pub fn extract_transcript(response: &Value) -> String {
    let found = match response {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => first_truthy(map, &["text", "transcript"])
            .or_else(|| {
                map.get("data")
                    .and_then(|d| d.get(0))
                    .and_then(|first| first.get("text"))
                    .filter(|v| is_truthy(v))
            })
            .or_else(|| first_truthy(map, &["output"]))
            .map(value_to_text),
        _ => None,
    };
    found.unwrap_or_else(|| {
        tracing::debug!("Transcription response carried no transcript");
        String::new()
    })
}
