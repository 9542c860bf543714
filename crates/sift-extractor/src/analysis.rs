//! Analysis oracle client with tiered fallback
//!
//! The deep tier gets one attempt. On any failure the client waits, then
//! tries the standard tier a few times. If nothing answers with a result
//! that fits the schema, a neutral placeholder is returned: analysis never
//! fails the caller.

use crate::config::AnalysisConfig;
use crate::parser::parse_analysis;
use crate::progress::ProgressTracker;
use crate::prompt::{analysis_payload, ANALYSIS_DIRECTIVE};
use crate::retry::{FailureClass, Sleeper, TokioSleeper};
use sift_domain::{
    AnalysisOracle, AnalysisResult, AnalysisTier, ProgressObserver, ProgressPhase, Record,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces a narrative analysis of a record set
pub struct AnalysisClient<A: AnalysisOracle> {
    oracle: Arc<A>,
    config: AnalysisConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl<A: AnalysisOracle> AnalysisClient<A> {
    /// Create a new client that sleeps on the tokio timer
    pub fn new(oracle: Arc<A>, config: AnalysisConfig) -> Self {
        Self::with_sleeper(oracle, config, Arc::new(TokioSleeper))
    }

    /// Create a new client with an explicit sleeper
    pub fn with_sleeper(oracle: Arc<A>, config: AnalysisConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            oracle,
            config,
            sleeper,
        }
    }

    /// Analyze the records; never fails
    pub async fn analyze(&self, records: &[Record]) -> AnalysisResult {
        if records.is_empty() {
            return AnalysisResult::placeholder("there are no records to analyze");
        }

        let payload = analysis_payload(records, self.config.record_limit);
        info!(
            "Analyzing {} record(s) ({} sent)",
            records.len(),
            records.len().min(self.config.record_limit)
        );

        match self.attempt(AnalysisTier::Deep, &payload).await {
            Ok(result) => return result,
            Err(reason) => {
                warn!("Deep analysis failed, falling back to standard tier: {}", reason);
            }
        }
        self.sleeper.sleep(self.config.fallback_delay()).await;

        let attempts = self.config.standard_attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(AnalysisTier::Standard, &payload).await {
                Ok(result) => return result,
                Err(reason) => {
                    warn!(
                        "Standard analysis attempt {}/{} failed: {}",
                        attempt, attempts, reason
                    );
                    if attempt < attempts {
                        let delay = if FailureClass::classify(&reason) == FailureClass::Quota {
                            self.config.quota_delay()
                        } else {
                            self.config.retry_delay()
                        };
                        self.sleeper.sleep(delay).await;
                    }
                }
            }
        }

        warn!("All analysis attempts failed; returning placeholder");
        AnalysisResult::placeholder("the analysis service did not respond")
    }

    /// Analyze the records, reporting `Analyzing` then `Complete`
    pub async fn analyze_with_progress(
        &self,
        records: &[Record],
        observers: &[&dyn ProgressObserver],
    ) -> AnalysisResult {
        let mut progress = ProgressTracker::new(observers);
        progress.report(0, "Analyzing records", ProgressPhase::Analyzing);
        let result = self.analyze(records).await;
        progress.report(100, "Analysis complete", ProgressPhase::Complete);
        result
    }

    async fn attempt(&self, tier: AnalysisTier, payload: &str) -> Result<AnalysisResult, String> {
        debug!("Analysis attempt on {} tier", tier.as_str());
        let response = self
            .oracle
            .analyze(tier, ANALYSIS_DIRECTIVE, payload)
            .await
            .map_err(|e| e.to_string())?;

        parse_analysis(&response)
            .ok_or_else(|| "response did not match the analysis schema".to_string())
    }
}
