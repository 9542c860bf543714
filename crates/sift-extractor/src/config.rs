//! Configuration for the Extractor

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Analysis client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum records sent to the analysis oracle
    pub record_limit: usize,

    /// Wait after the deep tier fails, before the standard tier (ms)
    pub fallback_delay_ms: u64,

    /// Attempts against the standard tier
    pub standard_attempts: u32,

    /// Delay between standard-tier attempts (ms)
    pub retry_delay_ms: u64,

    /// Delay between standard-tier attempts after a quota failure (ms)
    pub quota_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            record_limit: 300,
            fallback_delay_ms: 2_000,
            standard_attempts: 3,
            retry_delay_ms: 2_000,
            quota_delay_ms: 10_000,
        }
    }
}

impl AnalysisConfig {
    /// Fallback delay as a Duration
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    /// Regular retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Quota retry delay as a Duration
    pub fn quota_delay(&self) -> Duration {
        Duration::from_millis(self.quota_delay_ms)
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum pages per chunk when splitting a paged document
    pub max_pages_per_chunk: usize,

    /// Raw text longer than this many characters is chunked
    pub max_text_chars: usize,

    /// Delay inserted before every chunk after the first (ms)
    pub throttle_delay_ms: u64,

    /// Progress reported when extraction starts
    pub started_floor: u8,

    /// Progress reached when the last chunk completes, before the final 100
    pub progress_ceiling: u8,

    /// Retry policy for extraction calls
    pub retry: RetryPolicy,

    /// Analysis client settings
    pub analysis: AnalysisConfig,
}

impl ExtractorConfig {
    /// Get the throttle delay as a Duration
    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pages_per_chunk == 0 {
            return Err("max_pages_per_chunk must be greater than 0".to_string());
        }
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than 0".to_string());
        }
        if self.progress_ceiling > 100 {
            return Err("progress_ceiling cannot exceed 100".to_string());
        }
        if self.started_floor > self.progress_ceiling {
            return Err("started_floor cannot exceed progress_ceiling".to_string());
        }
        if self.analysis.record_limit == 0 {
            return Err("analysis.record_limit must be greater than 0".to_string());
        }
        self.retry.validate()
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_pages_per_chunk: 10,
            max_text_chars: 30_000,
            throttle_delay_ms: 4_000,
            started_floor: 10,
            progress_ceiling: 95,
            retry: RetryPolicy::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Conservative preset for free-tier quotas: smaller chunks, longer throttle
    pub fn conservative() -> Self {
        Self {
            max_pages_per_chunk: 5,
            max_text_chars: 15_000,
            throttle_delay_ms: 10_000,
            retry: RetryPolicy {
                max_attempts: 20,
                quota_base_ms: 15_000,
                quota_ceiling_ms: 65_000,
                ..RetryPolicy::default()
            },
            ..Self::default()
        }
    }

    /// Fast preset for paid-tier quotas: larger chunks, short throttle
    pub fn fast() -> Self {
        Self {
            max_pages_per_chunk: 20,
            max_text_chars: 60_000,
            throttle_delay_ms: 1_000,
            retry: RetryPolicy {
                max_attempts: 10,
                quota_base_ms: 5_000,
                quota_ceiling_ms: 30_000,
                ..RetryPolicy::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
