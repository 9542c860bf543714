//! Gemini Provider Implementation
//!
//! Provides integration with Google's Generative Language API
//! (`models/{model}:generateContent`).
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Inline document parts (base64) next to text parts
//! - JSON response mode
//! - Separate models per extraction speed and analysis tier
//!
//! The provider performs exactly one HTTP call per request. Retries belong to
//! the caller.
//!
//! # Examples
//!
//! ```no_run
//! use sift_llm::{GeminiConfig, GeminiProvider};
//!
//! let config = GeminiConfig::with_api_key("my-key");
//! let provider = GeminiProvider::new(config).unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sift_domain::{
    AnalysisOracle, AnalysisTier, ExtractionOracle, ModelSpeed, OracleRequest, ResponseFormat,
};
use std::time::Duration;
use tracing::debug;

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default timeout for one request; large PDFs take a while
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable read by [`GeminiConfig::from_env`]
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Connection and model settings for [`GeminiProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API endpoint without trailing slash
    pub endpoint: String,

    /// API key; empty means "not configured"
    pub api_key: String,

    /// Model for `ModelSpeed::Fast` extraction
    pub fast_model: String,

    /// Model for `ModelSpeed::Thorough` extraction
    pub thorough_model: String,

    /// Model for `AnalysisTier::Deep`
    pub deep_model: String,

    /// Model for `AnalysisTier::Standard`
    pub standard_model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            fast_model: "gemini-2.5-flash".to_string(),
            thorough_model: "gemini-2.5-pro".to_string(),
            deep_model: "gemini-2.5-pro".to_string(),
            standard_model: "gemini-2.5-flash".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Default settings with the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Default settings with the API key read from an environment variable
    ///
    /// A missing variable leaves the key empty; the orchestrator reports
    /// `MissingCredential` before any call is attempted.
    pub fn from_env(var: &str) -> Self {
        Self::with_api_key(std::env::var(var).unwrap_or_default())
    }

    /// Model used for an extraction call
    pub fn extraction_model(&self, speed: ModelSpeed) -> &str {
        match speed {
            ModelSpeed::Fast => &self.fast_model,
            ModelSpeed::Thorough => &self.thorough_model,
        }
    }

    /// Model used for an analysis call
    pub fn analysis_model(&self, tier: AnalysisTier) -> &str {
        match tier {
            AnalysisTier::Deep => &self.deep_model,
            AnalysisTier::Standard => &self.standard_model,
        }
    }
}

/// Gemini API provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

/// Request body for the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    temperature: f32,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Other` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Provider settings
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send one generateContent request and return the concatenated text
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if no API key is configured
    /// - `RateLimitExceeded` on HTTP 429
    /// - `Authentication` on HTTP 401/403
    /// - `SafetyBlocked` if the prompt or the answer was blocked
    /// - `Http` on other non-success statuses
    /// - `Communication` if the request never completed
    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::MissingCredential);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, model
        );
        debug!("POST {} ({} content blocks)", url, body.contents.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_for_status(status.as_u16(), &error_text, model));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        response_text(parsed)
    }
}

/// Map a non-success HTTP status to a classified error
fn error_for_status(status: u16, body: &str, model: &str) -> LlmError {
    match status {
        429 => LlmError::RateLimitExceeded(body.to_string()),
        401 | 403 => LlmError::Authentication(body.to_string()),
        404 => LlmError::ModelNotAvailable(model.to_string()),
        _ => LlmError::Http {
            status,
            message: body.to_string(),
        },
    }
}

/// Pull the answer text out of a response envelope
fn response_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::SafetyBlocked(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

    if matches!(candidate.finish_reason.as_deref(), Some("SAFETY") | Some("PROHIBITED_CONTENT")) {
        return Err(LlmError::SafetyBlocked(
            "answer blocked by safety filter".to_string(),
        ));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(text)
}

fn system_content(directive: &str) -> Option<Content> {
    if directive.is_empty() {
        return None;
    }
    Some(Content {
        role: None,
        parts: vec![Part::Text {
            text: directive.to_string(),
        }],
    })
}

/// Build the wire body for an extraction request
fn extraction_body(request: &OracleRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(request.parts.len() + 2);
    parts.push(Part::Text {
        text: request.instruction.clone(),
    });
    if let Some(context) = request.context_text.as_ref().filter(|t| !t.is_empty()) {
        parts.push(Part::Text {
            text: context.clone(),
        });
    }
    for part in &request.parts {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: part.mime_type.clone(),
                data: BASE64.encode(&part.data),
            },
        });
    }

    let response_mime_type = match request.response_format {
        ResponseFormat::Json => Some("application/json".to_string()),
    };

    GenerateContentRequest {
        system_instruction: system_content(&request.system_directive),
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type,
            temperature: 0.1,
        },
    }
}

#[async_trait]
impl ExtractionOracle for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        let model = self.config.extraction_model(request.speed).to_string();
        let body = extraction_body(request);
        self.generate_content(&model, &body).await
    }

    fn has_credential(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }
}

#[async_trait]
impl AnalysisOracle for GeminiProvider {
    type Error = LlmError;

    async fn analyze(
        &self,
        tier: AnalysisTier,
        system_directive: &str,
        payload: &str,
    ) -> Result<String, Self::Error> {
        let model = self.config.analysis_model(tier).to_string();
        let body = GenerateContentRequest {
            system_instruction: system_content(system_directive),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text {
                    text: payload.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                temperature: 0.3,
            },
        };
        self.generate_content(&model, &body).await
    }
}
