//! Recommendation Normalizer.
//!
//! Locates candidate text on an agent result, parses it as JSON (whole text,
//! then the greedy `{`…`}` span), and falls back to fixed-shape records when
//! there is nothing to parse. Shape-safety only; content is not validated.

use serde_json::Value;

use super::types::RecommendationRecord;
use crate::agent::{result_to_text, value_to_text, AgentResult};
use crate::config::log_preview;
use crate::extraction::analysis::{first_truthy, task_output_text};
use crate::extraction::find_json_object;

const DEFAULT_PATIENT_REPORT: &str = "No recommendations generated.";
const DEFAULT_DOCTOR_REPORT: &str = "Model returned no structured output.";
const DEFAULT_DISCLAIMER: &str = "Please consult a doctor.";
const TEXT_FALLBACK_DISCLAIMER: &str = "Non-JSON output returned — manual review required.";

/// Which path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The whole candidate text was a JSON object.
    Parsed,
    /// A JSON object was cut out of surrounding prose.
    Embedded,
    /// Candidate text was not JSON; it fills both reports.
    TextFallback,
    /// No candidate text was found at all.
    DefaultFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: RecommendationRecord,
    pub outcome: NormalizeOutcome,
}

/// Record returned when no candidate text exists.
pub fn default_failure_record() -> RecommendationRecord {
    RecommendationRecord::with_reports(
        DEFAULT_PATIENT_REPORT,
        DEFAULT_DOCTOR_REPORT,
        DEFAULT_DISCLAIMER,
    )
}

/// Record returned when candidate text is not JSON.
pub fn text_fallback_record(text: &str) -> RecommendationRecord {
    RecommendationRecord::with_reports(text, text, TEXT_FALLBACK_DISCLAIMER)
}

/// Normalize an agent result into a recommendation record. Never fails.
pub fn normalize_recommendations(result: &AgentResult) -> RecommendationRecord {
    normalize_with_outcome(result).record
}

/// Same as [`normalize_recommendations`], also reporting the path taken.
pub fn normalize_with_outcome(result: &AgentResult) -> Normalized {
    match candidate_text(result) {
        Some(text) => normalize_text_with_outcome(&text),
        None => {
            tracing::warn!("No candidate text on agent result, using default record");
            Normalized {
                record: default_failure_record(),
                outcome: NormalizeOutcome::DefaultFailure,
            }
        }
    }
}

/// Normalize a raw text block (steps after candidate location).
pub fn normalize_recommendation_text(text: &str) -> RecommendationRecord {
    normalize_text_with_outcome(text).record
}

fn normalize_text_with_outcome(text: &str) -> Normalized {
    let trimmed = text.trim();

    if let Some(record) = parse_record(trimmed) {
        return Normalized {
            record,
            outcome: NormalizeOutcome::Parsed,
        };
    }

    if let Some(record) = find_json_object(trimmed).and_then(parse_record) {
        tracing::debug!("Recovered recommendation JSON embedded in prose");
        return Normalized {
            record,
            outcome: NormalizeOutcome::Embedded,
        };
    }

    tracing::warn!(
        preview = %log_preview(trimmed),
        "Recommendation output was not JSON, wrapping raw text"
    );
    Normalized {
        record: text_fallback_record(trimmed),
        outcome: NormalizeOutcome::TextFallback,
    }
}

/// Strict parse; only a JSON object counts as success.
fn parse_record(text: &str) -> Option<RecommendationRecord> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(RecommendationRecord::from_json_object(&map)),
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Parsed JSON is not an object");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Recommendation JSON parse failed");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Priority chain: `json_dict`, then `raw`, then the first task output.
/// A bare text result is its own candidate.
fn candidate_text(result: &AgentResult) -> Option<String> {
    from_json_dict(result)
        .or_else(|| from_raw(result))
        .or_else(|| {
            result
                .tasks_output()
                .and_then(|tasks| tasks.first())
                .and_then(task_output_text)
        })
        .or_else(|| match result {
            AgentResult::PlainText(_) => result_to_text(result),
            _ => None,
        })
}

fn from_json_dict(result: &AgentResult) -> Option<String> {
    let Some(Value::Object(jd)) = result.field("json_dict") else {
        return None;
    };
    first_truthy(jd, &["final_output", "result"]).map(value_to_text)
}

fn from_raw(result: &AgentResult) -> Option<String> {
    let raw = result.field("raw")?;
    match raw {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => Some(
            first_truthy(map, &["output_text", "text"])
                .map(value_to_text)
                .unwrap_or_else(|| value_to_text(raw)),
        ),
        other => Some(value_to_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{FieldBag, Producer};
    use crate::recommendation::UrgencyLevel;
    use serde_json::json;

    const EXACT: &str = r#"{"patient_friendly_report":"A","doctor_friendly_report":"B","recommendations":{"diagnostic_tests":[],"specialist_referrals":[],"self_care_advice":[],"urgency_level":"low","red_flags":[],"disclaimer":"D"}}"#;

    const EMBEDDED: &str = "Here is your answer: {\"patient_friendly_report\":\"X\",\"doctor_friendly_report\":\"Y\",\"recommendations\":{\"diagnostic_tests\":[],\"specialist_referrals\":[],\"self_care_advice\":[],\"urgency_level\":\"high\",\"red_flags\":[],\"disclaimer\":\"Z\"}} Thanks!";

    fn with_raw(raw: impl Into<Value>) -> AgentResult {
        AgentResult::from(FieldBag::new().with_field("raw", raw))
    }

    #[test]
    fn exact_json_in_raw_is_parsed() {
        let normalized = normalize_with_outcome(&with_raw(EXACT));
        assert_eq!(normalized.outcome, NormalizeOutcome::Parsed);
        assert_eq!(normalized.record.patient_friendly_report, "A");
        assert_eq!(normalized.record.doctor_friendly_report, "B");
        assert_eq!(normalized.record.recommendations.urgency_level, UrgencyLevel::Low);
        assert_eq!(normalized.record.recommendations.disclaimer, "D");
    }

    #[test]
    fn embedded_json_is_isolated_from_prose() {
        let normalized = normalize_with_outcome(&with_raw(EMBEDDED));
        assert_eq!(normalized.outcome, NormalizeOutcome::Embedded);
        assert_eq!(normalized.record.patient_friendly_report, "X");
        assert_eq!(normalized.record.doctor_friendly_report, "Y");
        assert_eq!(normalized.record.recommendations.urgency_level, UrgencyLevel::High);
        assert_eq!(normalized.record.recommendations.disclaimer, "Z");
    }

    #[test]
    fn plain_prose_becomes_text_fallback() {
        let prose = "The scan looks normal, follow up in six weeks.";
        let normalized = normalize_with_outcome(&with_raw(prose));
        assert_eq!(normalized.outcome, NormalizeOutcome::TextFallback);
        assert_eq!(normalized.record, text_fallback_record(prose));
        assert_eq!(normalized.record.patient_friendly_report, prose);
        assert_eq!(normalized.record.doctor_friendly_report, prose);
        assert_eq!(normalized.record.recommendations.urgency_level, UrgencyLevel::Low);
        assert!(normalized.record.recommendations.diagnostic_tests.is_empty());
        assert!(normalized.record.recommendations.disclaimer.contains("manual review"));
    }

    #[test]
    fn unrecognized_result_returns_default_failure() {
        let result = AgentResult::from(FieldBag::new().with_field("status", "finished"));
        let normalized = normalize_with_outcome(&result);
        assert_eq!(normalized.outcome, NormalizeOutcome::DefaultFailure);
        assert_eq!(normalized.record, default_failure_record());
    }

    #[test]
    fn default_failure_record_literals() {
        let record = default_failure_record();
        assert_eq!(record.patient_friendly_report, "No recommendations generated.");
        assert_eq!(record.doctor_friendly_report, "Model returned no structured output.");
        assert_eq!(record.recommendations.disclaimer, "Please consult a doctor.");
        assert_eq!(record.recommendations.urgency_level, UrgencyLevel::Low);
        assert!(record.recommendations.red_flags.is_empty());
    }

    #[test]
    fn producer_only_result_returns_default_failure() {
        let result = AgentResult::Producer(Producer::returning("to_dict", json!({"raw": EXACT})));
        assert_eq!(normalize_recommendations(&result), default_failure_record());
    }

    #[test]
    fn json_dict_final_output_wins_over_raw() {
        let result = AgentResult::from(
            FieldBag::new()
                .with_field("json_dict", json!({"final_output": EXACT}))
                .with_field("raw", "ignored prose"),
        );
        assert_eq!(normalize_recommendations(&result).patient_friendly_report, "A");
    }

    #[test]
    fn json_dict_without_known_keys_falls_to_raw() {
        let result = AgentResult::from(
            FieldBag::new()
                .with_field("json_dict", json!({"other": "x"}))
                .with_field("raw", EMBEDDED),
        );
        assert_eq!(normalize_recommendations(&result).patient_friendly_report, "X");
    }

    #[test]
    fn string_json_dict_is_not_a_candidate() {
        let result = AgentResult::from(FieldBag::new().with_field("json_dict", EXACT));
        assert_eq!(normalize_recommendations(&result), default_failure_record());
    }

    #[test]
    fn raw_mapping_prefers_output_text() {
        let result = with_raw(json!({"output_text": EXACT, "text": "other"}));
        assert_eq!(normalize_recommendations(&result).patient_friendly_report, "A");
    }

    #[test]
    fn raw_mapping_without_text_is_parsed_whole() {
        let raw = json!({
            "patient_friendly_report": "Mapped",
            "doctor_friendly_report": "Directly",
            "recommendations": {"urgency_level": "emergency"}
        });
        let normalized = normalize_with_outcome(&with_raw(raw));
        assert_eq!(normalized.outcome, NormalizeOutcome::Parsed);
        assert_eq!(normalized.record.patient_friendly_report, "Mapped");
        assert_eq!(
            normalized.record.recommendations.urgency_level,
            UrgencyLevel::Emergency
        );
    }

    #[test]
    fn falsy_raw_is_still_coerced_to_text() {
        for (raw, text) in [(json!([]), "[]"), (json!(false), "false"), (json!(0), "0")] {
            let normalized = normalize_with_outcome(&with_raw(raw));
            assert_eq!(normalized.outcome, NormalizeOutcome::TextFallback);
            assert_eq!(normalized.record.patient_friendly_report, text);
            assert_eq!(normalized.record.doctor_friendly_report, text);
        }
    }

    #[test]
    fn first_task_output_is_used_last() {
        let result = AgentResult::from_json(json!({
            "tasks_output": [{"output": EXACT}, {"output": "second"}],
        }));
        assert_eq!(normalize_recommendations(&result).doctor_friendly_report, "B");
    }

    #[test]
    fn plain_text_result_is_its_own_candidate() {
        let normalized = normalize_with_outcome(&AgentResult::from(EXACT));
        assert_eq!(normalized.outcome, NormalizeOutcome::Parsed);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let normalized = normalize_with_outcome(&with_raw(format!("\n\n  {EXACT}  \n")));
        assert_eq!(normalized.outcome, NormalizeOutcome::Parsed);
    }

    #[test]
    fn json_array_is_not_a_record() {
        let normalized = normalize_with_outcome(&with_raw("[1, 2, 3]"));
        assert_eq!(normalized.outcome, NormalizeOutcome::TextFallback);
        assert_eq!(normalized.record.patient_friendly_report, "[1, 2, 3]");
    }

    #[test]
    fn truncated_json_falls_back_to_text() {
        let truncated = &EXACT[..EXACT.len() - 20];
        let normalized = normalize_with_outcome(&with_raw(truncated));
        assert_eq!(normalized.outcome, NormalizeOutcome::TextFallback);
        assert_eq!(normalized.record.patient_friendly_report, truncated);
    }

    #[test]
    fn stray_brace_in_trailing_prose_defeats_embedding() {
        let text = format!("Answer: {EXACT} (see notes}})");
        let normalized = normalize_with_outcome(&with_raw(text.clone()));
        assert_eq!(normalized.outcome, NormalizeOutcome::TextFallback);
        assert_eq!(normalized.record.patient_friendly_report, text);
    }

    #[test]
    fn raw_text_block_entry_point() {
        assert_eq!(normalize_recommendation_text(EMBEDDED).doctor_friendly_report, "Y");
    }

    #[test]
    fn normalization_is_deterministic() {
        let result = with_raw(EMBEDDED);
        let a = serde_json::to_string(&normalize_recommendations(&result)).unwrap();
        let b = serde_json::to_string(&normalize_recommendations(&result)).unwrap();
        assert_eq!(a, b);
    }
}
