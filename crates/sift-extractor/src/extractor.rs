//! Core Extractor implementation

use crate::chunking::{PageChunker, TextChunker};
use crate::client::ExtractionClient;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::messages::user_message;
use crate::pdf::LopdfCodec;
use crate::progress::{chunk_percent, ProgressTracker};
use crate::retry::{ResilientExecutor, Sleeper, TokioSleeper};
use crate::types::{ExtractionMetadata, ExtractionResult, Strategy};
use sift_domain::{
    ContentPart, Document, ExtractionOracle, ExtractionRequest, OracleRequest, PagedCodec,
    ProgressObserver, ProgressPhase, Record, RequestId,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Extractor turns documents and text into records
///
/// One call to [`Extractor::extract`] is one logical task: chunks are
/// submitted strictly in order, with a throttle delay before every chunk
/// after the first.
pub struct Extractor<O, C = LopdfCodec>
where
    O: ExtractionOracle,
    C: PagedCodec,
{
    client: ExtractionClient<O>,
    codec: C,
    executor: ResilientExecutor,
    sleeper: Arc<dyn Sleeper>,
    config: ExtractorConfig,
}

/// Records and bookkeeping from one strategy run
struct Outcome {
    records: Vec<Record>,
    strategy: Strategy,
    chunk_count: usize,
}

impl<O> Extractor<O, LopdfCodec>
where
    O: ExtractionOracle,
{
    /// Create a new Extractor with the PDF codec and the tokio timer
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the configuration is invalid.
    pub fn new(oracle: O, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_parts(Arc::new(oracle), LopdfCodec, config, Arc::new(TokioSleeper))
    }
}

impl<O, C> Extractor<O, C>
where
    O: ExtractionOracle,
    C: PagedCodec,
{
    /// Create a new Extractor from explicit collaborators
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the configuration is invalid.
    pub fn with_parts(
        oracle: Arc<O>,
        codec: C,
        config: ExtractorConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            client: ExtractionClient::new(oracle),
            codec,
            executor: ResilientExecutor::new(config.retry.clone(), Arc::clone(&sleeper)),
            sleeper,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract records, reporting progress to every observer
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any oracle call. An oracle
    /// failure that survives the retry policy aborts the remaining chunks and
    /// discards partial results. An `Error`-phase event is emitted either way.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
        observers: &[&dyn ProgressObserver],
    ) -> Result<ExtractionResult, ExtractorError> {
        let start_time = Instant::now();
        let request_id = RequestId::new();
        let mut progress = ProgressTracker::new(observers);
        let calls = AtomicU32::new(0);

        info!(
            "Starting extraction {}: {} document(s), {} chars of text, {} model",
            request_id,
            request.documents.len(),
            request.text.chars().count(),
            request.speed.as_str()
        );

        let outcome = match self.validate(request) {
            Ok(()) => self.run(request, &mut progress, &calls).await,
            Err(e) => Err(e),
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Extraction {} failed: {}", request_id, e);
                progress.fail(user_message(&e));
                return Err(e);
            }
        };

        let result = ExtractionResult::new(
            outcome.records,
            ExtractionMetadata {
                request_id,
                strategy: outcome.strategy,
                chunk_count: outcome.chunk_count,
                oracle_calls: calls.load(Ordering::SeqCst),
                processing_time_ms: start_time.elapsed().as_millis() as u64,
                speed: request.speed,
            },
        );

        let status = if result.records.is_empty() {
            "No matching records found".to_string()
        } else {
            format!("Extracted {} record(s)", result.records.len())
        };
        progress.report(100, status, ProgressPhase::Complete);

        info!(
            "Extraction {} complete: {} record(s), strategy {}, {} chunk(s), {} oracle call(s)",
            request_id,
            result.records.len(),
            result.metadata.strategy,
            result.metadata.chunk_count,
            result.metadata.oracle_calls
        );

        Ok(result)
    }

    fn validate(&self, request: &ExtractionRequest) -> Result<(), ExtractorError> {
        if request.goal.trim().is_empty() {
            return Err(ExtractorError::NoGoalProvided);
        }
        if request.has_no_input() {
            return Err(ExtractorError::NoInputProvided);
        }
        if !self.client.has_credential() {
            return Err(ExtractorError::MissingCredential);
        }
        Ok(())
    }

    /// Pick a strategy and run it
    async fn run(
        &self,
        request: &ExtractionRequest,
        progress: &mut ProgressTracker<'_>,
        calls: &AtomicU32,
    ) -> Result<Outcome, ExtractorError> {
        progress.report(
            self.config.started_floor,
            "Preparing input",
            ProgressPhase::Extracting,
        );

        match request.documents.as_slice() {
            [] if request.text.chars().count() > self.config.max_text_chars => {
                self.run_text_chunks(request, progress, calls).await
            }
            [document] if document.is_paged() => {
                match self.run_paged_chunks(request, document, progress, calls).await {
                    Err(ExtractorError::Decode(reason)) => {
                        warn!(
                            "Could not split '{}' ({}); sending it unchunked",
                            document.name, reason
                        );
                        if calls.load(Ordering::SeqCst) > 0 {
                            self.throttle().await;
                        }
                        self.run_single(request, Strategy::SingleShot, progress, calls)
                            .await
                    }
                    other => other,
                }
            }
            [_] | [] => {
                self.run_single(request, Strategy::SingleShot, progress, calls)
                    .await
            }
            _ => {
                info!(
                    "Comparing {} documents in one call",
                    request.documents.len()
                );
                self.run_single(request, Strategy::Comparison, progress, calls)
                    .await
            }
        }
    }

    /// One call carrying every document, with the text as context
    async fn run_single(
        &self,
        request: &ExtractionRequest,
        strategy: Strategy,
        progress: &mut ProgressTracker<'_>,
        calls: &AtomicU32,
    ) -> Result<Outcome, ExtractorError> {
        let parts = request.documents.iter().map(document_part).collect();
        let oracle_request = self.client.build_request(
            &request.goal,
            Some(&request.text),
            parts,
            request.speed,
            None,
        );

        progress.report(
            self.config.started_floor,
            "Extracting records",
            ProgressPhase::Extracting,
        );
        let records = self.call(&oracle_request, calls).await?;

        Ok(Outcome {
            records,
            strategy,
            chunk_count: 1,
        })
    }

    /// Sequential calls over page ranges of one paged document
    ///
    /// A document at or under the page bound is sent as a single shot.
    async fn run_paged_chunks(
        &self,
        request: &ExtractionRequest,
        document: &Document,
        progress: &mut ProgressTracker<'_>,
        calls: &AtomicU32,
    ) -> Result<Outcome, ExtractorError> {
        let chunker = PageChunker::new(&self.codec, self.config.max_pages_per_chunk);
        let chunks = chunker.chunks(&document.data)?;
        let total = chunks.total();

        if total <= 1 {
            debug!(
                "'{}' has {} page(s); no chunking needed",
                document.name,
                chunks.page_count()
            );
            return self
                .run_single(request, Strategy::SingleShot, progress, calls)
                .await;
        }

        info!(
            "Splitting '{}' ({} pages) into {} chunks of up to {} pages",
            document.name,
            chunks.page_count(),
            total,
            self.config.max_pages_per_chunk
        );

        let mut records = Vec::new();
        for chunk in chunks {
            let chunk = chunk?;
            if chunk.index > 0 {
                self.throttle().await;
            }

            progress.report(
                chunk_percent(
                    self.config.started_floor,
                    self.config.progress_ceiling,
                    chunk.index,
                    total,
                ),
                format!(
                    "Extracting pages {}-{} (part {} of {})",
                    chunk.pages.start + 1,
                    chunk.pages.end,
                    chunk.index + 1,
                    total
                ),
                ProgressPhase::Extracting,
            );

            let oracle_request = self.client.build_request(
                &request.goal,
                Some(&request.text),
                vec![ContentPart::new(document.mime_type.clone(), chunk.data)],
                request.speed,
                Some((chunk.index, total)),
            );
            let found = self.call(&oracle_request, calls).await?;
            debug!("Part {} of {}: {} record(s)", chunk.index + 1, total, found.len());
            records.extend(found);

            self.report_chunk_done(progress, chunk.index + 1, total);
        }

        Ok(Outcome {
            records,
            strategy: Strategy::PagedChunks,
            chunk_count: total,
        })
    }

    /// Sequential calls over character windows of the raw text
    async fn run_text_chunks(
        &self,
        request: &ExtractionRequest,
        progress: &mut ProgressTracker<'_>,
        calls: &AtomicU32,
    ) -> Result<Outcome, ExtractorError> {
        let pieces = TextChunker::new(self.config.max_text_chars).chunk(&request.text);
        let total = pieces.len();

        info!(
            "Splitting text into {} chunks of up to {} chars",
            total, self.config.max_text_chars
        );

        let mut records = Vec::new();
        for (index, piece) in pieces.into_iter().enumerate() {
            if index > 0 {
                self.throttle().await;
            }

            progress.report(
                chunk_percent(
                    self.config.started_floor,
                    self.config.progress_ceiling,
                    index,
                    total,
                ),
                format!("Extracting text part {} of {}", index + 1, total),
                ProgressPhase::Extracting,
            );

            let oracle_request = self.client.build_request(
                &request.goal,
                Some(piece),
                Vec::new(),
                request.speed,
                Some((index, total)),
            );
            records.extend(self.call(&oracle_request, calls).await?);

            self.report_chunk_done(progress, index + 1, total);
        }

        Ok(Outcome {
            records,
            strategy: Strategy::TextChunks,
            chunk_count: total,
        })
    }

    /// One oracle call through the executor, counting every attempt
    async fn call(
        &self,
        request: &OracleRequest,
        calls: &AtomicU32,
    ) -> Result<Vec<Record>, ExtractorError> {
        let client = &self.client;
        let records = self
            .executor
            .execute(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                client.send(request)
            })
            .await?;
        Ok(records)
    }

    async fn throttle(&self) {
        let delay = self.config.throttle_delay();
        if !delay.is_zero() {
            debug!("Throttling for {:?} before next chunk", delay);
            self.sleeper.sleep(delay).await;
        }
    }

    fn report_chunk_done(&self, progress: &mut ProgressTracker<'_>, done: usize, total: usize) {
        progress.report(
            chunk_percent(
                self.config.started_floor,
                self.config.progress_ceiling,
                done,
                total,
            ),
            format!("Finished part {} of {}", done, total),
            ProgressPhase::Extracting,
        );
    }
}

fn document_part(document: &Document) -> ContentPart {
    ContentPart::new(document.mime_type.clone(), document.data.clone())
}
