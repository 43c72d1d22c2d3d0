//! Agent calls wrapped with extraction and fallback.
//!
//! The HTTP layer calls these and includes the result directly in its
//! response; agent failures degrade to fixed text or records instead of
//! propagating.

use std::sync::Arc;

use serde::Serialize;

use crate::agent::{AgentRunner, AgentTask, TaskInput, TaskKind};
use crate::annotation::{parse_annotation_response, AnnotationError, AnnotationSet};
use crate::config::{ANALYSIS_UNAVAILABLE, REPORT_UNAVAILABLE};
use crate::extraction::{
    extract_analysis_text, extract_body_part, extract_patient_info, extract_text,
    layout_voice_analysis, PatientInfo,
};
use crate::recommendation::{
    default_failure_record, normalize_recommendations, ContextType, RecommendationInput,
    RecommendationRecord,
};

/// Report for one image of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    pub filename: String,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchImageAnalysis {
    pub images: Vec<ImageReport>,
    pub combined_report: String,
}

/// Everything derived from one voice transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceAssessment {
    pub patient_info: PatientInfo,
    pub analysis: String,
    pub recommendations: RecommendationRecord,
}

pub struct MedicalAssistant {
    runner: Arc<dyn AgentRunner>,
    fallback: Option<Arc<dyn AgentRunner>>,
}

impl MedicalAssistant {
    pub fn new(runner: Arc<dyn AgentRunner>) -> Self {
        Self {
            runner,
            fallback: None,
        }
    }

    /// Runner used for voice analysis when the primary runner fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn AgentRunner>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn analyze_image(&self, image: &[u8]) -> String {
        self.radiology_report(AgentTask::new(
            TaskKind::RadiologyImage,
            TaskInput::Image(image.to_vec()),
        ))
    }

    pub fn analyze_pdf(&self, pdf: &[u8]) -> String {
        self.radiology_report(AgentTask::new(
            TaskKind::RadiologyPdf,
            TaskInput::Pdf(pdf.to_vec()),
        ))
    }

    /// Analyze each image independently; one failure does not stop the batch.
    pub fn analyze_images(&self, images: &[(String, Vec<u8>)]) -> BatchImageAnalysis {
        let images: Vec<ImageReport> = images
            .iter()
            .map(|(filename, bytes)| ImageReport {
                filename: filename.clone(),
                report: self.analyze_image(bytes),
            })
            .collect();

        let combined_report = images
            .iter()
            .map(|r| r.report.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        BatchImageAnalysis {
            images,
            combined_report,
        }
    }

    /// Voice analysis in the nine-section layout.
    pub fn analyze_voice(&self, transcript: &str) -> String {
        match self.voice_analysis_text(transcript) {
            Some(text) => layout_voice_analysis(&text),
            None => ANALYSIS_UNAVAILABLE.to_string(),
        }
    }

    /// Patient details, analysis and recommendations for one transcript.
    pub fn assess_voice(&self, transcript: &str) -> VoiceAssessment {
        let patient_info = extract_patient_info(transcript);
        let analysis = self.analyze_voice(transcript);
        let input = RecommendationInput::Voice {
            transcript: transcript.to_string(),
            analysis: analysis.clone(),
        };
        let recommendations = self.recommend(&input, ContextType::VoiceSymptoms);

        VoiceAssessment {
            patient_info,
            analysis,
            recommendations,
        }
    }

    pub fn recommend(
        &self,
        input: &RecommendationInput,
        context: ContextType,
    ) -> RecommendationRecord {
        let task = AgentTask::new(
            TaskKind::Recommendation(context),
            TaskInput::Text(input.render()),
        );
        match self.runner.run(&task) {
            Ok(result) => normalize_recommendations(&result),
            Err(e) => {
                tracing::warn!(
                    context = context.as_str(),
                    error = %e,
                    "Recommendation generation failed"
                );
                default_failure_record()
            }
        }
    }

    /// Empty string when the agent call fails.
    pub fn identify_body_part(&self, image: &[u8]) -> String {
        let task = AgentTask::new(TaskKind::BodyPart, TaskInput::Image(image.to_vec()));
        match self.runner.run(&task) {
            Ok(result) => extract_body_part(&result),
            Err(e) => {
                tracing::warn!(error = %e, "Body part identification failed");
                String::new()
            }
        }
    }

    pub fn annotate(&self, image: &[u8]) -> Result<AnnotationSet, AnnotationError> {
        let task = AgentTask::new(TaskKind::Annotation, TaskInput::Image(image.to_vec()));
        let result = self.runner.run(&task)?;
        parse_annotation_response(&extract_text(&result))
    }

    fn voice_analysis_text(&self, transcript: &str) -> Option<String> {
        let task = AgentTask::new(TaskKind::VoiceAnalysis, TaskInput::Text(transcript.to_string()));

        let primary_err = match self.runner.run(&task) {
            Ok(result) => return Some(extract_analysis_text(&result)),
            Err(e) => e,
        };
        tracing::warn!(error = %primary_err, "Voice analysis failed, trying fallback runner");

        let fallback = self.fallback.as_ref()?;
        match fallback.run(&task) {
            Ok(result) => Some(extract_analysis_text(&result)),
            Err(e) => {
                tracing::warn!(error = %e, "Fallback voice analysis failed");
                None
            }
        }
    }

    fn radiology_report(&self, task: AgentTask) -> String {
        match self.runner.run(&task) {
            Ok(result) => extract_text(&result),
            Err(e) => {
                tracing::warn!(kind = task.kind.as_str(), error = %e, "Radiology agent failed");
                REPORT_UNAVAILABLE.to_string()
            }
        }
    }
}
