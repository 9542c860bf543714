//! Sift Extractor
//!
//! Turns documents and free text into flat records using an extraction
//! oracle, and optionally summarizes them with an analysis oracle.
//!
//! # Overview
//!
//! Oracle calls are slow, quota-limited and unreliable. This crate owns
//! everything between the caller and the oracle: splitting oversized inputs
//! into chunks, retrying calls under a classification-driven backoff policy,
//! tolerating malformed JSON, aggregating records in order and reporting
//! coarse progress.
//!
//! # Architecture
//!
//! ```text
//! Request → Extractor → Chunker → [ResilientExecutor → ExtractionClient] per chunk → Records
//! Records → AnalysisClient → Deep tier → Standard tier → placeholder
//! ```
//!
//! # Strategies
//!
//! - **Comparison**: several documents go out in one call, never chunked
//! - **PagedChunks**: one PDF over the page bound is split by page ranges
//! - **TextChunks**: raw text over the character bound is split by characters
//! - **SingleShot**: everything else, and the fallback when a PDF cannot be parsed
//!
//! # Example Usage
//!
//! ```no_run
//! use sift_extractor::{AnalysisClient, Extractor, ExtractorConfig};
//! use sift_domain::ExtractionRequest;
//! use sift_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"[{"name": "Alice", "employer": "Acme"}]"#);
//! let config = ExtractorConfig::default();
//! let analysis = AnalysisClient::new(Arc::new(llm.clone()), config.analysis.clone());
//! let extractor = Extractor::new(llm, config)?;
//!
//! let request = ExtractionRequest::new("List people and employers")
//!     .with_text("Alice works at Acme Corp.");
//!
//! let result = extractor.extract(&request, &[]).await?;
//! println!("Found {} records", result.records.len());
//!
//! let summary = analysis.analyze(&result.records).await;
//! println!("{}", summary.summary);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analysis;
mod chunking;
mod client;
mod config;
mod error;
mod extractor;
mod messages;
mod parser;
mod pdf;
mod progress;
mod prompt;
mod retry;
mod types;

#[cfg(test)]
mod tests;

pub use analysis::AnalysisClient;
pub use chunking::{page_ranges, PageChunk, PageChunker, PageChunks, TextChunker};
pub use client::ExtractionClient;
pub use config::{AnalysisConfig, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use messages::user_message;
pub use parser::{parse_analysis, parse_records};
pub use pdf::LopdfCodec;
pub use progress::{ChannelObserver, ProgressTracker};
pub use retry::{
    FailureClass, OracleFailure, ResilientExecutor, RetryPolicy, Sleeper, TokioSleeper,
};
pub use types::{ExtractionMetadata, ExtractionResult, ExtractionStatus, Strategy};
