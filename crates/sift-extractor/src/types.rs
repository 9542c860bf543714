//! Result types for extraction

use serde::{Deserialize, Serialize};
use sift_domain::{ModelSpeed, Record, RequestId};
use std::fmt;

/// How the orchestrator handled a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Several documents in one call, never chunked
    Comparison,

    /// One paged document split by page ranges
    PagedChunks,

    /// Raw text split by character count
    TextChunks,

    /// One unchunked call
    SingleShot,
}

impl Strategy {
    /// Get the strategy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Comparison => "comparison",
            Strategy::PagedChunks => "paged_chunks",
            Strategy::TextChunks => "text_chunks",
            Strategy::SingleShot => "single_shot",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// At least one record was found
    Complete,

    /// All calls succeeded but none produced a record
    NoRecordsFound,
}

/// Result of an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Records in chunk order, then oracle emission order
    pub records: Vec<Record>,

    /// Whether anything was found
    pub status: ExtractionStatus,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    pub(crate) fn new(records: Vec<Record>, metadata: ExtractionMetadata) -> Self {
        let status = if records.is_empty() {
            ExtractionStatus::NoRecordsFound
        } else {
            ExtractionStatus::Complete
        };
        Self {
            records,
            status,
            metadata,
        }
    }
}

/// Metadata about an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Identifier of this run
    pub request_id: RequestId,

    /// Strategy the orchestrator chose
    pub strategy: Strategy,

    /// Number of chunks submitted (1 for unchunked strategies)
    pub chunk_count: usize,

    /// Oracle attempts made, retries included
    pub oracle_calls: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Model speed preference passed to the oracle
    pub speed: ModelSpeed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> ExtractionMetadata {
        ExtractionMetadata {
            request_id: RequestId::new(),
            strategy: Strategy::SingleShot,
            chunk_count: 1,
            oracle_calls: 1,
            processing_time_ms: 0,
            speed: ModelSpeed::Thorough,
        }
    }

    #[test]
    fn test_empty_result_is_no_records_found() {
        let result = ExtractionResult::new(Vec::new(), metadata());
        assert_eq!(result.status, ExtractionStatus::NoRecordsFound);
    }

    #[test]
    fn test_non_empty_result_is_complete() {
        let record = json!({"a": 1}).as_object().cloned().unwrap();
        let result = ExtractionResult::new(vec![record], metadata());
        assert_eq!(result.status, ExtractionStatus::Complete);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::PagedChunks.to_string(), "paged_chunks");
        assert_eq!(
            serde_json::to_string(&Strategy::TextChunks).unwrap(),
            "\"text_chunks\""
        );
    }
}
