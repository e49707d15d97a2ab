pub mod matcher;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod reasoner;
pub mod rules;

pub use matcher::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use reasoner::*;
pub use rules::*;

use thiserror::Error;

use crate::genai::GenAiError;

/// Precondition failures surfaced to the caller. Everything that can go
/// wrong past the preconditions degrades to rule-based evaluation instead.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No medications provided for validation")]
    EmptyRegimen,

    #[error("Patient profile with date of birth is required")]
    IncompletePatientProfile,
}

/// Failure inside the generative path. Never crosses the public API; the
/// reasoner absorbs it by falling back to the rule-based evaluator.
#[derive(Error, Debug)]
pub enum ReasonerError {
    #[error(transparent)]
    GenAi(#[from] GenAiError),

    #[error("Patient demographics unavailable for prompt construction")]
    MissingDemographics,

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Response shape violation: {0}")]
    ShapeViolation(String),
}
