use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::value_to_text;

/// Patient- and doctor-facing reports plus structured next steps.
///
/// Always fully populated: absent data is an empty string or sequence, never
/// a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub patient_friendly_report: String,
    pub doctor_friendly_report: String,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub diagnostic_tests: Vec<String>,
    pub specialist_referrals: Vec<String>,
    pub self_care_advice: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub red_flags: Vec<String>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Moderate,
    High,
    Emergency,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }

    /// Case-insensitive match; anything unrecognized is `Low`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "high" => Self::High,
            "emergency" => Self::Emergency,
            other => {
                tracing::warn!(value = other, "Unrecognized urgency level, using low");
                Self::Low
            }
        }
    }
}

impl RecommendationRecord {
    /// Record with the given reports and disclaimer and no structured advice.
    pub fn with_reports(patient: &str, doctor: &str, disclaimer: &str) -> Self {
        Self {
            patient_friendly_report: patient.to_string(),
            doctor_friendly_report: doctor.to_string(),
            recommendations: Recommendations {
                disclaimer: disclaimer.to_string(),
                ..Recommendations::default()
            },
        }
    }

    /// Map a parsed JSON object onto the fixed shape.
    ///
    /// Missing or wrongly-typed keys take their defaults; non-string list
    /// items are skipped.
    pub fn from_json_object(map: &Map<String, Value>) -> Self {
        let recs = map.get("recommendations").and_then(Value::as_object);
        let rec_list = |key: &str| recs.map(|r| string_list(r.get(key))).unwrap_or_default();
        let rec_text = |key: &str| recs.map(|r| text_field(r.get(key))).unwrap_or_default();

        Self {
            patient_friendly_report: text_field(map.get("patient_friendly_report")),
            doctor_friendly_report: text_field(map.get("doctor_friendly_report")),
            recommendations: Recommendations {
                diagnostic_tests: rec_list("diagnostic_tests"),
                specialist_referrals: rec_list("specialist_referrals"),
                self_care_advice: rec_list("self_care_advice"),
                urgency_level: recs
                    .and_then(|r| r.get("urgency_level"))
                    .and_then(Value::as_str)
                    .map(UrgencyLevel::parse_lenient)
                    .unwrap_or_default(),
                red_flags: rec_list("red_flags"),
                disclaimer: rec_text("disclaimer"),
            },
        }
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => value_to_text(v),
    }
}

/// Parse a list leniently: skip items that are not strings.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        // A lone string where a list was expected
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => vec![],
    }
}
