//! Analysis module - narrative analysis over extracted records

use serde::{Deserialize, Serialize};

/// Overall sentiment of the extracted data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Favourable
    Positive,

    /// Neither favourable nor unfavourable
    #[default]
    Neutral,

    /// Unfavourable
    Negative,
}

impl Sentiment {
    /// Get the sentiment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Parse a sentiment from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid sentiment: {}", s))
    }
}

/// Capability tier of the analysis oracle
///
/// The deep tier is tried first; the standard tier is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisTier {
    /// High-capability, slower, more quota-constrained
    Deep,

    /// Standard-capability fallback
    Standard,
}

impl AnalysisTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTier::Deep => "deep",
            AnalysisTier::Standard => "standard",
        }
    }

    /// The tier to fall back to after this one fails
    pub fn fallback(&self) -> Option<Self> {
        match self {
            AnalysisTier::Deep => Some(AnalysisTier::Standard),
            AnalysisTier::Standard => None,
        }
    }
}

/// Narrative analysis of a record set
///
/// The wire format uses camelCase keys (`keyEntities`, `suggestedActions`,
/// `heuristicAnalysis`), which is also what the oracle is asked to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Short narrative summary
    pub summary: String,

    /// Overall sentiment
    pub sentiment: Sentiment,

    /// Key entities, most important first
    #[serde(default)]
    pub key_entities: Vec<String>,

    /// Suggested follow-up actions
    #[serde(default)]
    pub suggested_actions: Vec<String>,

    /// Data-quality and pattern observations
    #[serde(default)]
    pub heuristic_analysis: Vec<String>,
}

impl AnalysisResult {
    /// Deterministic result used when no analysis oracle could answer
    pub fn placeholder(reason: &str) -> Self {
        Self {
            summary: format!(
                "Automatic analysis is unavailable right now ({}). The extracted records are unaffected.",
                reason
            ),
            sentiment: Sentiment::Neutral,
            key_entities: Vec::new(),
            suggested_actions: Vec::new(),
            heuristic_analysis: vec!["Analysis could not be generated; try again later.".to_string()],
        }
    }
}
