/// Application-level constants
pub const APP_NAME: &str = "HealthVision";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returned by the extractor when no probe yields text.
pub const UNEXTRACTABLE_PLACEHOLDER: &str = "<unextractable-result>";

/// Returned by analysis extraction when the agent produced nothing usable.
pub const NO_ANALYSIS_PRODUCED: &str = "No analysis produced.";

/// Report text used when the radiology agent call itself fails.
pub const REPORT_UNAVAILABLE: &str =
    "[Error generating report] The radiology analysis service is currently unavailable.";

/// Voice analysis text used when both primary and fallback agents fail.
pub const ANALYSIS_UNAVAILABLE: &str = "[Analysis service unavailable]";

/// Maximum characters of extracted text echoed into debug logs.
pub const LOG_PREVIEW_CHARS: usize = 500;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AGENT_MODEL: &str = "gpt-4o";
const DEFAULT_RADIOLOGY_MODEL: &str = "gpt-5.1";
const DEFAULT_ANNOTATION_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_VOICE_ANALYSIS_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "healthvision_lib=debug,healthvision=debug"
    } else {
        "healthvision_lib=info,healthvision=info"
    }
}

/// Settings for the hosted agent runner, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// `None` means no runner can be constructed; callers see an absent handle.
    pub api_key: Option<String>,
    pub base_url: String,
    pub agent_model: String,
    pub radiology_model: String,
    pub annotation_model: String,
    pub voice_analysis_model: String,
    pub timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            agent_model: DEFAULT_AGENT_MODEL.to_string(),
            radiology_model: DEFAULT_RADIOLOGY_MODEL.to_string(),
            annotation_model: DEFAULT_ANNOTATION_MODEL.to_string(),
            voice_analysis_model: DEFAULT_VOICE_ANALYSIS_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AgentSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let timeout_secs = match get("AGENT_TIMEOUT_SECS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid AGENT_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            agent_model: get("AGENT_MODEL").unwrap_or(defaults.agent_model),
            radiology_model: get("RADIOLOGY_MODEL").unwrap_or(defaults.radiology_model),
            annotation_model: get("ANNOTATION_MODEL").unwrap_or(defaults.annotation_model),
            voice_analysis_model: get("VOICE_ANALYSIS_MODEL")
                .unwrap_or(defaults.voice_analysis_model),
            timeout_secs,
        }
    }
}

/// Char-safe prefix of `text` for log output.
pub fn log_preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
