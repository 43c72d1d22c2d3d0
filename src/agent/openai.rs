use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::result::AgentResult;
use super::runner::{AgentRunner, AgentTask, TaskInput, TaskKind};
use super::AgentError;
use crate::config::AgentSettings;
use crate::recommendation::ContextType;

/// Chat-completions client for a hosted OpenAI-compatible endpoint.
pub struct OpenAiRunner {
    settings: AgentSettings,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiRunner {
    /// Requires an API key; without one no runner exists.
    pub fn new(settings: AgentSettings) -> Result<Self, AgentError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| AgentError::NotConfigured("OPENAI_API_KEY is not set".into()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AgentError::HttpClient(e.to_string()))?;

        Ok(Self {
            settings: AgentSettings {
                base_url: settings.base_url.trim_end_matches('/').to_string(),
                ..settings
            },
            api_key,
            client,
        })
    }

    fn model_for(&self, kind: TaskKind) -> &str {
        match kind {
            TaskKind::RadiologyImage => &self.settings.radiology_model,
            TaskKind::Annotation => &self.settings.annotation_model,
            TaskKind::RadiologyPdf
            | TaskKind::VoiceAnalysis
            | TaskKind::Recommendation(_)
            | TaskKind::BodyPart => &self.settings.agent_model,
        }
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Value,
}

/// Subset of the /chat/completions response we care about.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl AgentRunner for OpenAiRunner {
    fn run(&self, task: &AgentTask) -> Result<AgentResult, AgentError> {
        let url = format!("{}/chat/completions", self.settings.base_url);
        let model = self.model_for(task.kind);
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: Value::String(task_instruction(task.kind).to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: user_content(&task.input),
                },
            ],
        };

        tracing::debug!(kind = task.kind.as_str(), model, "Running agent task");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AgentError::Connection(self.settings.base_url.clone())
                } else if e.is_timeout() {
                    AgentError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.settings.timeout_secs
                    ))
                } else {
                    AgentError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .map_err(|e| AgentError::ResponseParsing(e.to_string()))?;

        Ok(adapt_completion(payload))
    }
}

/// Lift `choices[0].message.content` into `raw` so downstream probes find it.
pub fn adapt_completion(payload: Value) -> AgentResult {
    let content = serde_json::from_value::<ChatResponse>(payload.clone())
        .ok()
        .and_then(|r| r.choices.into_iter().next())
        .and_then(|c| c.message.content);

    match content {
        Some(text) => AgentResult::from_json(json!({
            "raw": text,
            "model": payload.get("model").cloned().unwrap_or(Value::Null),
        })),
        None => {
            tracing::debug!("Completion carried no message content");
            AgentResult::from_json(payload)
        }
    }
}

fn task_instruction(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::RadiologyImage | TaskKind::RadiologyPdf => {
            "You are an expert radiologist. Produce a clean, structured radiology report."
        }
        TaskKind::VoiceAnalysis => {
            "You are a clinical assistant. Produce a structured Markdown interpretation of the patient transcript."
        }
        TaskKind::Recommendation(ContextType::ImagingReport) => {
            "The text is an imaging report. Return ONLY a JSON object with patient_friendly_report, doctor_friendly_report and recommendations."
        }
        TaskKind::Recommendation(ContextType::VoiceSymptoms) => {
            "The text is a symptom description. Return ONLY a JSON object with patient_friendly_report, doctor_friendly_report and recommendations."
        }
        TaskKind::BodyPart => "Only return the name of the body part visible in the image.",
        TaskKind::Annotation => {
            "Return ONLY JSON: {\"findings\": [{\"label\": \"...\", \"description\": \"...\", \"bbox\": [x, y, w, h]}]}"
        }
    }
}

fn user_content(input: &TaskInput) -> Value {
    let engine = base64::engine::general_purpose::STANDARD;
    match input {
        TaskInput::Text(text) => Value::String(text.clone()),
        TaskInput::Image(bytes) => json!([
            {
                "type": "image_url",
                "image_url": { "url": format!("data:image/png;base64,{}", engine.encode(bytes)) }
            },
            { "type": "text", "text": "Analyze this medical image." }
        ]),
        TaskInput::Pdf(bytes) => json!([
            {
                "type": "file",
                "file": {
                    "filename": "report.pdf",
                    "file_data": format!("data:application/pdf;base64,{}", engine.encode(bytes))
                }
            },
            { "type": "text", "text": "Analyze the provided radiology PDF." }
        ]),
    }
}
