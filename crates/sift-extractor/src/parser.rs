//! Parse oracle output into records and analysis results
//!
//! Oracle output is unreliable: it may be wrapped in a Markdown code fence,
//! surrounded by prose, or not JSON at all. Record parsing never fails; an
//! unusable response yields an empty sequence.

use serde_json::Value;
use sift_domain::{AnalysisResult, Record, Sentiment};
use tracing::{debug, warn};

/// Parse an extraction response into records
///
/// Arrays keep only their object elements; a single object becomes a
/// one-element sequence; anything else is empty.
pub fn parse_records(response: &str) -> Vec<Record> {
    let body = strip_code_fence(response);

    match serde_json::from_str::<Value>(body) {
        Ok(value) => records_from_value(value),
        Err(e) => {
            debug!("Strict parse failed ({}); looking for an array span", e);
            match span(body, '[', ']').map(serde_json::from_str::<Value>) {
                Some(Ok(value @ Value::Array(_))) => records_from_value(value),
                _ => {
                    warn!("Oracle response contained no parsable records");
                    Vec::new()
                }
            }
        }
    }
}

/// Parse an analysis response; `None` when it does not fit the schema
pub fn parse_analysis(response: &str) -> Option<AnalysisResult> {
    let body = strip_code_fence(response);

    let value = serde_json::from_str::<Value>(body)
        .ok()
        .filter(Value::is_object)
        .or_else(|| span(body, '{', '}').and_then(|s| serde_json::from_str(s).ok()))?;

    analysis_from_value(value)
}

fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => {
            let total = items.len();
            let records: Vec<Record> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if records.len() < total {
                debug!("Discarded {} non-object element(s)", total - records.len());
            }
            records
        }
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

fn analysis_from_value(mut value: Value) -> Option<AnalysisResult> {
    // Accept "Positive", "NEUTRAL", ...
    if let Some(sentiment) = value.get_mut("sentiment") {
        if let Some(parsed) = sentiment.as_str().and_then(Sentiment::parse) {
            *sentiment = Value::String(parsed.as_str().to_string());
        }
    }

    match serde_json::from_value::<AnalysisResult>(value) {
        Ok(result) if !result.summary.trim().is_empty() => Some(result),
        Ok(_) => {
            warn!("Analysis response had an empty summary");
            None
        }
        Err(e) => {
            warn!("Analysis response did not match the schema: {}", e);
            None
        }
    }
}

/// Remove a surrounding Markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag line (```json)
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Slice from the first `open` to the last `close`, inclusive
fn span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
