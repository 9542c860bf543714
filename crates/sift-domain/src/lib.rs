//! Sift Domain Layer
//!
//! Core data model and trait seams for the Sift extraction pipeline.
//!
//! ## Key Concepts
//!
//! - **Record**: an open field-name to scalar mapping produced by the oracle
//! - **ExtractionRequest**: goal, text and documents supplied once per run
//! - **ProgressState**: non-decreasing percentage, status phrase and phase
//! - **AnalysisResult**: narrative summary over a record set
//!
//! ## Architecture
//!
//! This crate holds no I/O. Oracles and codecs are expressed as traits so the
//! orchestration layer can be exercised with fakes:
//! - `ExtractionOracle` / `AnalysisOracle`: implemented in `sift-llm`
//! - `PagedCodec`: implemented in `sift-extractor` on top of `lopdf`
//! - `ProgressObserver`: implemented by callers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod progress;
pub mod record;
pub mod request;
pub mod traits;

// Re-exports for convenience
pub use analysis::{AnalysisResult, AnalysisTier, Sentiment};
pub use progress::{ProgressObserver, ProgressPhase, ProgressState};
pub use record::Record;
pub use request::{Document, ExtractionRequest, ModelSpeed, RequestId, PDF_MIME_TYPE};
pub use traits::{
    AnalysisOracle, ContentPart, DecodeError, ExtractionOracle, OracleRequest, PagedCodec,
    ResponseFormat,
};
