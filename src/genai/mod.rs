pub mod client;

pub use client::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("Cannot reach generative API at {0}")]
    Connection(String),

    #[error("Generate request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Generative API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Sampling parameters for a single generate call.
///
/// Defaults are tuned for clinical analysis: low temperature for
/// reproducible findings and enough output budget for a full flag list.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 4096,
        }
    }
}

/// A text-in/text-out generative model.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, GenAiError>;
}
