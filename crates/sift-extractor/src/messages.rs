//! User-facing error messages

use crate::error::ExtractorError;
use crate::retry::{mentions, FailureClass};

/// Translate an error into one sentence a user can act on
pub fn user_message(error: &ExtractorError) -> String {
    match error {
        ExtractorError::NoGoalProvided => {
            "Please describe what you want to extract.".to_string()
        }
        ExtractorError::NoInputProvided => {
            "Please provide some text or at least one document to process.".to_string()
        }
        ExtractorError::MissingCredential => {
            "No API key is configured. Set it in the environment or the config file.".to_string()
        }
        ExtractorError::Config(reason) => format!("The configuration is invalid: {}.", reason),
        ExtractorError::Oracle { class, message, .. } => match class {
            FailureClass::Authentication => {
                "The API key was rejected. Check that it is valid and has access to the model."
                    .to_string()
            }
            FailureClass::Quota => {
                "The usage quota was exhausted. Wait a minute and try again, or use smaller inputs."
                    .to_string()
            }
            FailureClass::Safety => {
                "The request was blocked by the content safety filter.".to_string()
            }
            _ => from_text(message),
        },
        ExtractorError::Decode(_) => from_text(&error.to_string()),
    }
}

fn from_text(message: &str) -> String {
    let lower = message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| mentions(&lower, m));

    if has(&["api key", "401", "403", "unauthenticated"]) {
        "The API key was rejected. Check that it is valid and has access to the model.".to_string()
    } else if has(&["429", "quota", "rate limit", "resource_exhausted"]) {
        "The usage quota was exhausted. Wait a minute and try again, or use smaller inputs."
            .to_string()
    } else if has(&["503", "overloaded", "unavailable"]) {
        "The extraction service is overloaded right now. Please try again shortly.".to_string()
    } else if has(&["blocked", "safety"]) {
        "The request was blocked by the content safety filter.".to_string()
    } else if has(&["json", "parse", "invalid response", "decode"]) {
        "The document or the service response could not be read. Try a different file."
            .to_string()
    } else if has(&["network", "connection", "fetch", "timed out", "timeout"]) {
        "Could not reach the extraction service. Check your network connection.".to_string()
    } else {
        format!("Extraction failed: {}", message)
    }
}
