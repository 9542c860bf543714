//! Sift LLM Provider Layer
//!
//! Oracle implementations for the extraction and analysis traits defined in
//! `sift-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted, deterministic oracle for testing
//! - `GeminiProvider`: Google Generative Language API over HTTP
//!
//! Providers never retry. Every failure is returned as an [`LlmError`] whose
//! message carries the HTTP status or provider reason, so the retry layer in
//! `sift-extractor` can classify it.
//!
//! # Examples
//!
//! ```
//! use sift_llm::MockProvider;
//! use sift_domain::{ExtractionOracle, OracleRequest};
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"[{"a": 1}]"#);
//! let text = provider.generate(&OracleRequest::default()).await.unwrap();
//! assert_eq!(text, r#"[{"a": 1}]"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use sift_domain::{AnalysisOracle, AnalysisTier, ExtractionOracle, OracleRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or transport failure before a response arrived
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status not covered by a more specific variant
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// Rate limit or quota exceeded
    #[error("Rate limit exceeded (429): {0}")]
    RateLimitExceeded(String),

    /// Request or response blocked by the provider's safety filter
    #[error("Response blocked by safety filter: {0}")]
    SafetyBlocked(String),

    /// Credential rejected by the provider
    #[error("Authentication failed (API key rejected): {0}")]
    Authentication(String),

    /// No credential configured
    #[error("API key not configured")]
    MissingCredential,

    /// Invalid response envelope from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock LLM provider for deterministic testing
///
/// Replies are taken from a FIFO script; once the script is empty the default
/// response is returned. Every extraction request and analysis tier is
/// recorded so tests can assert on call counts and ordering.
///
/// # Examples
///
/// ```
/// use sift_llm::{LlmError, MockProvider};
/// use sift_domain::{ExtractionOracle, OracleRequest};
///
/// # async fn example() {
/// let provider = MockProvider::new("[]");
/// provider.push_error(LlmError::RateLimitExceeded("slow down".into()));
/// provider.push_response(r#"[{"id": "007"}]"#);
///
/// let request = OracleRequest::default();
/// assert!(provider.generate(&request).await.is_err());
/// assert_eq!(provider.generate(&request).await.unwrap(), r#"[{"id": "007"}]"#);
/// assert_eq!(provider.generate(&request).await.unwrap(), "[]");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
    analysis_calls: Arc<Mutex<Vec<AnalysisTier>>>,
    call_count: Arc<Mutex<usize>>,
    credential: bool,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed default response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            analysis_calls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            credential: true,
        }
    }

    /// Simulate a provider with no configured credential
    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    /// Queue a successful response
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Total number of calls across both oracle traits
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count and the recorded calls
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
        lock(&self.requests).clear();
        lock(&self.analysis_calls).clear();
    }

    /// Extraction requests received so far, in order
    pub fn requests(&self) -> Vec<OracleRequest> {
        lock(&self.requests).clone()
    }

    /// Analysis tiers called so far, in order
    pub fn analysis_calls(&self) -> Vec<AnalysisTier> {
        lock(&self.analysis_calls).clone()
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl ExtractionOracle for MockProvider {
    type Error = LlmError;

    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        lock(&self.requests).push(request.clone());
        self.next_reply()
    }

    fn has_credential(&self) -> bool {
        self.credential
    }
}

#[async_trait]
impl AnalysisOracle for MockProvider {
    type Error = LlmError;

    async fn analyze(
        &self,
        tier: AnalysisTier,
        _system_directive: &str,
        _payload: &str,
    ) -> Result<String, Self::Error> {
        lock(&self.analysis_calls).push(tier);
        self.next_reply()
    }
}
