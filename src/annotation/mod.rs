pub mod parser;

pub use parser::*;

use thiserror::Error;

use crate::agent::AgentError;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("No valid JSON found in annotation response")]
    NoJsonFound,

    #[error("JSON parsing error: {0}")]
    InvalidJson(String),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}
