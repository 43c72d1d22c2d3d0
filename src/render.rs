//! Markdown summaries of detection results and action recommendations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    #[serde(default)]
    pub reports: Vec<Detection>,
    #[serde(default)]
    pub recommendations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecommendation {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub description: String,
}

pub fn detection_summary_markdown(summary: &DetectionSummary) -> String {
    let mut md = String::from("### Detection Summary\n\n");

    if summary.reports.is_empty() {
        md.push_str("- No objects detected.\n\n");
    } else {
        md.push_str("**Detected Objects:**\n");
        for d in &summary.reports {
            md.push_str(&format!("- **{}** (confidence: {:.2})\n", d.label, d.confidence));
        }
        md.push('\n');
    }

    if !summary.recommendations.is_empty() {
        md.push_str("### Recommendations\n");
        md.push_str(&summary.recommendations);
        md.push('\n');
    }

    md
}

pub fn action_recommendations_markdown(recs: &[ActionRecommendation]) -> String {
    let mut md = String::from("### Recommendations\n\n");

    if recs.is_empty() {
        md.push_str("- No recommendations provided.\n");
        return md;
    }

    for r in recs {
        let action = r.action.as_deref().unwrap_or("Action");
        md.push_str(&format!("- **{action}:** {}\n", r.description));
    }

    md
}
