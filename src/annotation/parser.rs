//! Bounding-box annotation instructions returned by the annotation agent.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::AnnotationError;

/// Greedy object span; `.` also matches newlines.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    #[serde(default)]
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// `[x, y, w, h]` in image pixels.
    pub bbox: [f64; 4],
}

impl Finding {
    pub fn x(&self) -> f64 {
        self.bbox[0]
    }

    pub fn y(&self) -> f64 {
        self.bbox[1]
    }

    pub fn width(&self) -> f64 {
        self.bbox[2]
    }

    pub fn height(&self) -> f64 {
        self.bbox[3]
    }
}

/// Parse the annotation agent's text into findings.
pub fn parse_annotation_response(response: &str) -> Result<AnnotationSet, AnnotationError> {
    let json_str = JSON_OBJECT_RE
        .find(response)
        .map(|m| m.as_str())
        .ok_or(AnnotationError::NoJsonFound)?;

    let set: AnnotationSet = serde_json::from_str(json_str)
        .map_err(|e| AnnotationError::InvalidJson(e.to_string()))?;

    tracing::debug!(findings = set.findings.len(), "Parsed annotation instructions");
    Ok(set)
}
