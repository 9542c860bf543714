//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sift_extractor::ExtractorConfig;
use sift_llm::gemini::{DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use sift_llm::GeminiConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Oracle connection settings
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Chunking, throttling and retry tunables
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Oracle connection settings.
///
/// The API key itself is never stored; only the name of the environment
/// variable that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Environment variable holding the API key
    pub api_key_env: String,

    /// API endpoint
    pub endpoint: String,

    /// Model for fast extraction
    pub fast_model: String,

    /// Model for thorough extraction
    pub thorough_model: String,

    /// Model for deep analysis
    pub deep_model: String,

    /// Model for standard analysis
    pub standard_model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Print progress lines on stderr
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl OutputFormat {
    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Quiet => "quiet",
        }
    }

    /// Parse a format name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "quiet" => Some(OutputFormat::Quiet),
            _ => None,
        }
    }
}

impl Config {
    /// Directory holding the config file and session state.
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sift"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from the given file, or the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            config.extractor.validate().map_err(CliError::Config)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the given file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Provider settings, with the API key read from the environment.
    pub fn gemini_config(&self) -> GeminiConfig {
        let g = &self.gemini;
        GeminiConfig {
            endpoint: g.endpoint.trim_end_matches('/').to_string(),
            api_key: std::env::var(&g.api_key_env).unwrap_or_default(),
            fast_model: g.fast_model.clone(),
            thorough_model: g.thorough_model.clone(),
            deep_model: g.deep_model.clone(),
            standard_model: g.standard_model.clone(),
            timeout_secs: g.timeout_secs,
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        let models = GeminiConfig::default();
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fast_model: models.fast_model,
            thorough_model: models.thorough_model,
            deep_model: models.deep_model,
            standard_model: models.standard_model,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            progress: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
