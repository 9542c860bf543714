//! Extraction oracle client: one request in, records out

use crate::parser::parse_records;
use crate::prompt::{extraction_instruction, EXTRACTION_DIRECTIVE};
use sift_domain::{
    ContentPart, ExtractionOracle, ModelSpeed, OracleRequest, Record, ResponseFormat,
};
use std::sync::Arc;
use tracing::debug;

/// Issues single extraction calls and parses the responses
///
/// The client never retries; wrap [`ExtractionClient::send`] in a
/// [`ResilientExecutor`](crate::ResilientExecutor) for that.
pub struct ExtractionClient<O: ExtractionOracle> {
    oracle: Arc<O>,
}

impl<O: ExtractionOracle> Clone for ExtractionClient<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
        }
    }
}

impl<O: ExtractionOracle> ExtractionClient<O> {
    /// Create a new client over a shared oracle
    pub fn new(oracle: Arc<O>) -> Self {
        Self { oracle }
    }

    /// Whether the oracle has a credential configured
    pub fn has_credential(&self) -> bool {
        self.oracle.has_credential()
    }

    /// Build the request for one call
    ///
    /// `chunk` is `(index, total)` when the call covers one part of a larger
    /// input.
    pub fn build_request(
        &self,
        goal: &str,
        context_text: Option<&str>,
        parts: Vec<ContentPart>,
        speed: ModelSpeed,
        chunk: Option<(usize, usize)>,
    ) -> OracleRequest {
        OracleRequest {
            system_directive: EXTRACTION_DIRECTIVE.to_string(),
            instruction: extraction_instruction(goal, chunk),
            context_text: context_text
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
            parts,
            response_format: ResponseFormat::Json,
            speed,
        }
    }

    /// Send a prepared request and parse the response
    ///
    /// # Errors
    ///
    /// Returns the oracle's error unchanged; malformed output is not an error
    /// and yields an empty sequence.
    pub async fn send(&self, request: &OracleRequest) -> Result<Vec<Record>, O::Error> {
        let response = self.oracle.generate(request).await?;
        let records = parse_records(&response);
        debug!(
            "Oracle returned {} bytes, {} record(s)",
            response.len(),
            records.len()
        );
        Ok(records)
    }

    /// Build and send one extraction call
    pub async fn extract(
        &self,
        goal: &str,
        context_text: Option<&str>,
        parts: Vec<ContentPart>,
        speed: ModelSpeed,
    ) -> Result<Vec<Record>, O::Error> {
        let request = self.build_request(goal, context_text, parts, speed, None);
        self.send(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_llm::{LlmError, MockProvider};

    #[tokio::test]
    async fn test_extract_builds_one_request() {
        let mock = Arc::new(MockProvider::new(r#"[{"id": "007", "qty": 2}]"#));
        let client = ExtractionClient::new(mock.clone());

        let parts = vec![ContentPart::new("image/png", vec![1, 2, 3])];
        let records = client
            .extract("List items", Some("extra notes"), parts, ModelSpeed::Fast)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(mock.call_count(), 1);

        let request = &mock.requests()[0];
        assert_eq!(request.system_directive, EXTRACTION_DIRECTIVE);
        assert!(request.instruction.contains("List items"));
        assert_eq!(request.context_text.as_deref(), Some("extra notes"));
        assert_eq!(request.parts.len(), 1);
        assert_eq!(request.speed, ModelSpeed::Fast);
        assert_eq!(request.response_format, ResponseFormat::Json);
    }

    #[tokio::test]
    async fn test_extract_tolerates_garbage() {
        let mock = Arc::new(MockProvider::new("I could not find anything, sorry."));
        let client = ExtractionClient::new(mock);

        let records = client
            .extract("List items", None, Vec::new(), ModelSpeed::Thorough)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_extract_propagates_oracle_error() {
        let mock = Arc::new(MockProvider::default());
        mock.push_error(LlmError::RateLimitExceeded("slow down".to_string()));
        let client = ExtractionClient::new(mock.clone());

        let result = client
            .extract("List items", None, Vec::new(), ModelSpeed::Thorough)
            .await;
        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_blank_context_is_omitted() {
        let client = ExtractionClient::new(Arc::new(MockProvider::default()));
        let request = client.build_request("goal", Some("   "), Vec::new(), ModelSpeed::Fast, None);
        assert!(request.context_text.is_none());
    }

    #[test]
    fn test_chunk_notice_in_request() {
        let client = ExtractionClient::new(Arc::new(MockProvider::default()));
        let request =
            client.build_request("goal", None, Vec::new(), ModelSpeed::Fast, Some((0, 4)));
        assert!(request.instruction.contains("part 1 of 4"));
    }
}
