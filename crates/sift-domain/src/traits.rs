//! Trait definitions for external interactions
//!
//! These traits define the boundaries between orchestration logic and
//! infrastructure. Oracle implementations live in `sift-llm`; the PDF codec
//! lives in `sift-extractor`.

use crate::analysis::AnalysisTier;
use crate::request::ModelSpeed;
use async_trait::async_trait;
use std::fmt;
use std::ops::Range;

/// Output format constraint sent with every extraction request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// The oracle must answer with JSON
    #[default]
    Json,
}

/// A binary or textual payload attached to an oracle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    /// MIME type of the payload
    pub mime_type: String,

    /// Raw bytes
    pub data: Vec<u8>,
}

impl ContentPart {
    /// Create a new content part
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// One request to the extraction oracle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OracleRequest {
    /// Fixed system-level directive
    pub system_directive: String,

    /// Caller instruction, possibly with a chunk notice appended
    pub instruction: String,

    /// Optional auxiliary text (raw text input or a text chunk)
    pub context_text: Option<String>,

    /// Zero or more document parts
    pub parts: Vec<ContentPart>,

    /// Output format constraint
    pub response_format: ResponseFormat,

    /// Model speed preference
    pub speed: ModelSpeed,
}

/// Trait for the structured-extraction oracle
///
/// Implemented by the infrastructure layer (sift-llm). Implementations must
/// not retry internally; the error's `Display` text is what the retry policy
/// classifies, so it should carry status codes and provider messages.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Error type for oracle operations
    type Error: fmt::Display + Send + Sync + 'static;

    /// Issue one request and return the raw response text
    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error>;

    /// Whether a credential is configured; checked before any call is made
    fn has_credential(&self) -> bool {
        true
    }
}

/// Trait for the deep-analysis oracle
///
/// Implemented by the infrastructure layer (sift-llm).
#[async_trait]
pub trait AnalysisOracle: Send + Sync {
    /// Error type for oracle operations
    type Error: fmt::Display + Send + Sync + 'static;

    /// Issue one analysis request against the given tier
    async fn analyze(
        &self,
        tier: AnalysisTier,
        system_directive: &str,
        payload: &str,
    ) -> Result<String, Self::Error>;
}

/// Failure to parse a paged document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decode error: {}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// Trait for a paged-document container codec
///
/// Page indices are zero-based.
pub trait PagedCodec: Send + Sync {
    /// Parsed document handle
    type Handle;

    /// Parse a document from bytes
    fn load(&self, bytes: &[u8]) -> Result<Self::Handle, DecodeError>;

    /// Number of pages in the document
    fn page_count(&self, handle: &Self::Handle) -> usize;

    /// Encode the given contiguous page range as a new standalone document
    fn extract_page_range(
        &self,
        handle: &Self::Handle,
        pages: Range<usize>,
    ) -> Result<Vec<u8>, DecodeError>;
}
