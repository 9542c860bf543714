//! Analyze command implementation.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{Formatter, StderrProgress};
use crate::store::SessionStore;
use sift_domain::ProgressObserver;
use sift_extractor::AnalysisClient;
use sift_llm::GeminiProvider;
use std::sync::Arc;

/// Execute the analyze command against the last saved session.
pub async fn execute_analyze(
    config: &Config,
    store: &SessionStore,
    formatter: &Formatter,
) -> Result<()> {
    let session = store.load_session()?.ok_or_else(|| {
        CliError::InvalidInput("No saved session; run `sift extract` first".into())
    })?;

    let provider = Arc::new(GeminiProvider::new(config.gemini_config())?);
    let client = AnalysisClient::new(provider, config.extractor.analysis.clone());

    let printer = StderrProgress::new(config.settings.color);
    let observers: Vec<&dyn ProgressObserver> = if config.settings.progress {
        vec![&printer]
    } else {
        Vec::new()
    };

    let analysis = client
        .analyze_with_progress(&session.records, &observers)
        .await;
    println!("{}", formatter.format_analysis(&analysis)?);

    store.save_session(&session.records, Some(&analysis))?;
    Ok(())
}
