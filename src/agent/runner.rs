use std::sync::{Arc, OnceLock};

use super::result::AgentResult;
use super::AgentError;
use crate::config::AgentSettings;
use crate::recommendation::ContextType;

/// What the agent is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Structured radiology report from a single image.
    RadiologyImage,
    /// Structured radiology report from a PDF scan.
    RadiologyPdf,
    /// Clinical interpretation of a patient voice transcript.
    VoiceAnalysis,
    /// Patient/doctor reports plus next-step recommendations.
    Recommendation(ContextType),
    /// Name of the body part visible in an image.
    BodyPart,
    /// Bounding-box findings for an image.
    Annotation,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RadiologyImage => "radiology_image",
            Self::RadiologyPdf => "radiology_pdf",
            Self::VoiceAnalysis => "voice_analysis",
            Self::Recommendation(_) => "recommendation",
            Self::BodyPart => "body_part",
            Self::Annotation => "annotation",
        }
    }
}

/// Payload handed to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Text(String),
    Image(Vec<u8>),
    Pdf(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTask {
    pub kind: TaskKind,
    pub input: TaskInput,
}

impl AgentTask {
    pub fn new(kind: TaskKind, input: TaskInput) -> Self {
        Self { kind, input }
    }
}

/// Hosted agent abstraction (allows mocking).
pub trait AgentRunner: Send + Sync {
    fn run(&self, task: &AgentTask) -> Result<AgentResult, AgentError>;
}

type RunnerFactory = dyn Fn() -> Result<Arc<dyn AgentRunner>, AgentError> + Send + Sync;

/// Runner handle constructed on first use.
///
/// A failed construction is cached as an absent handle; every later call
/// reports `AgentError::NotConfigured` without retrying the factory.
pub struct LazyRunner {
    factory: Box<RunnerFactory>,
    slot: OnceLock<Option<Arc<dyn AgentRunner>>>,
}

impl LazyRunner {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn AgentRunner>, AgentError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            slot: OnceLock::new(),
        }
    }

    /// Lazily build an [`OpenAiRunner`](super::OpenAiRunner) from `settings`.
    pub fn from_settings(settings: AgentSettings) -> Self {
        Self::new(move || {
            let runner = super::OpenAiRunner::new(settings.clone())?;
            Ok(Arc::new(runner) as Arc<dyn AgentRunner>)
        })
    }

    /// The underlying runner, constructing it if this is the first use.
    pub fn get(&self) -> Option<Arc<dyn AgentRunner>> {
        self.slot
            .get_or_init(|| match (self.factory)() {
                Ok(runner) => Some(runner),
                Err(e) => {
                    tracing::warn!(error = %e, "Agent runner unavailable");
                    None
                }
            })
            .clone()
    }
}

impl AgentRunner for LazyRunner {
    fn run(&self, task: &AgentTask) -> Result<AgentResult, AgentError> {
        match self.get() {
            Some(runner) => runner.run(task),
            None => Err(AgentError::NotConfigured(
                "agent runner could not be constructed".into(),
            )),
        }
    }
}
