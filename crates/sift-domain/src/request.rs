//! Extraction requests - what a caller submits for one processing run

use std::fmt;

/// Unique identifier for one extraction request based on UUIDv7
///
/// UUIDv7 keeps request ids chronologically sortable, which makes log lines
/// and saved sessions easy to order without a separate timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RequestId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RequestId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since Unix epoch encoded in the UUIDv7
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// MIME type of PDF documents, the only paged container we chunk
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A document supplied by the caller
///
/// The payload is kept as raw bytes; oracle implementations decide how to
/// encode it on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// MIME type (e.g. `application/pdf`, `image/png`, `text/plain`)
    pub mime_type: String,

    /// Raw document bytes
    pub data: Vec<u8>,

    /// Display name, usually the file name
    pub name: String,
}

impl Document {
    /// Create a new document
    pub fn new(
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            name: name.into(),
        }
    }

    /// Whether this document is a paged container that can be split by page
    pub fn is_paged(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE)
    }
}

/// Model speed preference for extraction calls
///
/// Oracle implementations map each preference to a concrete model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelSpeed {
    /// Cheaper, lower-latency model
    Fast,

    /// Higher-capability model
    #[default]
    Thorough,
}

impl ModelSpeed {
    /// Get the speed name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSpeed::Fast => "fast",
            ModelSpeed::Thorough => "thorough",
        }
    }
}

/// Request to extract records from text and/or documents
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// Natural-language extraction goal, passed to the oracle verbatim
    pub goal: String,

    /// Raw text; auxiliary context when documents are also present
    pub text: String,

    /// Zero or more documents
    pub documents: Vec<Document>,

    /// Model speed preference
    pub speed: ModelSpeed,
}

impl ExtractionRequest {
    /// Create a request with a goal and nothing else
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Attach raw text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attach a document
    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    /// Set the model speed preference
    pub fn with_speed(mut self, speed: ModelSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// True when neither text nor documents were supplied
    pub fn has_no_input(&self) -> bool {
        self.text.trim().is_empty() && self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_display_and_parse() {
        let id = RequestId::new();
        let id_str = id.to_string();
        assert_eq!(id_str.len(), 36);

        let parsed = RequestId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_request_id_invalid_string() {
        assert!(RequestId::from_string("not-a-valid-uuid").is_err());
        assert!(RequestId::from_string("").is_err());
    }

    #[test]
    fn test_request_id_chronological() {
        let id1 = RequestId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RequestId::new();

        assert!(id1 < id2);
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_document_is_paged() {
        assert!(Document::new("application/pdf", vec![], "a.pdf").is_paged());
        assert!(Document::new("Application/PDF", vec![], "a.pdf").is_paged());
        assert!(!Document::new("image/png", vec![], "a.png").is_paged());
        assert!(!Document::new("text/plain", vec![], "a.txt").is_paged());
    }

    #[test]
    fn test_request_has_no_input() {
        assert!(ExtractionRequest::new("goal").has_no_input());
        assert!(ExtractionRequest::new("goal").with_text("   ").has_no_input());
        assert!(!ExtractionRequest::new("goal").with_text("data").has_no_input());
        assert!(!ExtractionRequest::new("goal")
            .with_document(Document::new("image/png", vec![1], "x.png"))
            .has_no_input());
    }
}
