//! Agent-call boundary.
//!
//! Whatever a hosted agent returns is adapted once into [`AgentResult`]; the
//! extraction and normalization stages only ever see that closed set of shapes.

pub mod coerce;
pub mod openai;
pub mod result;
pub mod runner;

pub use coerce::*;
pub use openai::OpenAiRunner;
pub use result::*;
pub use runner::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent runner is not configured: {0}")]
    NotConfigured(String),

    #[error("Agent service unreachable at {0}")]
    Connection(String),

    #[error("Agent service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Agent response could not be decoded: {0}")]
    ResponseParsing(String),

    #[error("Unsupported task input: {0}")]
    UnsupportedInput(String),
}

/// A producer method on an agent result failed when invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Producer `{method}` failed: {reason}")]
pub struct ProducerError {
    pub method: String,
    pub reason: String,
}
