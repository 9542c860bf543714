//! Error types for the Extractor

use crate::retry::{FailureClass, OracleFailure};
use sift_domain::DecodeError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// Malformed input document; recovered by fallback inside the orchestrator
    #[error("Document decode error: {0}")]
    Decode(String),

    /// Oracle call failed after the retry policy gave up
    #[error("Oracle call failed after {attempts} attempt(s) [{}]: {message}", class.as_str())]
    Oracle {
        /// How the final failure was classified
        class: FailureClass,
        /// Attempts made before giving up
        attempts: u32,
        /// Final failure message
        message: String,
    },

    /// No API credential configured
    #[error("No API key configured for the extraction service")]
    MissingCredential,

    /// Neither text nor documents were supplied
    #[error("No input provided: supply text or at least one document")]
    NoInputProvided,

    /// The extraction goal was empty
    #[error("No extraction goal provided")]
    NoGoalProvided,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DecodeError> for ExtractorError {
    fn from(e: DecodeError) -> Self {
        ExtractorError::Decode(e.0)
    }
}

impl From<OracleFailure> for ExtractorError {
    fn from(f: OracleFailure) -> Self {
        ExtractorError::Oracle {
            class: f.class,
            attempts: f.attempts,
            message: f.message,
        }
    }
}
