use serde::{Deserialize, Serialize};

/// Where the text handed to the recommendation agent came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    #[default]
    ImagingReport,
    VoiceSymptoms,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImagingReport => "imaging_report",
            Self::VoiceSymptoms => "voice_symptoms",
        }
    }
}

/// Input to recommendation generation: a report, or a voice transcript with
/// its analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationInput {
    Text(String),
    Voice { transcript: String, analysis: String },
}

impl RecommendationInput {
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Voice {
                transcript,
                analysis,
            } => format!("Transcript:\n{transcript}\n\nAnalysis:\n{analysis}"),
        }
    }
}

impl From<&str> for RecommendationInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
