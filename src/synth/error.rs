//! Failure taxonomy for a synthesis request.

use thiserror::Error;

/// Every way a synthesis request can fail.
///
/// Only [`SynthesisError::ValidationExhausted`] comes out of the correction
/// loop; every other variant ends the request on first occurrence.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Missing {0} environment variable.")]
    MissingCredential(&'static str),

    #[error("Failed to assemble the repository corpus")]
    Fetch(#[source] anyhow::Error),

    #[error("Model service error: {0}")]
    ModelService(String),

    #[error("Model response did not include textual output.")]
    NoTextualOutput,

    #[error("Unable to locate {language} diagram in model response.")]
    DiagramNotFound { language: &'static str },

    #[error(
        "Failed to generate valid {language} diagram after {attempts} attempts. Last error: {last_error}"
    )]
    ValidationExhausted { language: &'static str, attempts: usize, last_error: String },

    #[error("Diagram validator unavailable: {0}")]
    ValidatorUnavailable(String),

    #[error("Diff is empty; nothing to enhance the diagram with.")]
    EmptyDiff,
}

pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;
