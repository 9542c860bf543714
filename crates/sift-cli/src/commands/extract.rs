//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{Formatter, StderrProgress};
use crate::store::SessionStore;
use sift_domain::{Document, ExtractionRequest, ModelSpeed, ProgressObserver};
use sift_extractor::{AnalysisClient, Extractor, LopdfCodec, TokioSleeper};
use sift_llm::GeminiProvider;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    store: &SessionStore,
    formatter: &Formatter,
) -> Result<()> {
    let goal = resolve_goal(args.goal.as_deref(), store)?;
    let request = build_request(&goal, &args)?;

    let provider = Arc::new(GeminiProvider::new(config.gemini_config())?);
    let extractor = Extractor::with_parts(
        Arc::clone(&provider),
        LopdfCodec,
        config.extractor.clone(),
        Arc::new(TokioSleeper),
    )?;

    let printer = StderrProgress::new(config.settings.color);
    let observers: Vec<&dyn ProgressObserver> = if config.settings.progress {
        vec![&printer]
    } else {
        Vec::new()
    };

    // Remember the goal even when the run fails, so it can be retried.
    store.set_last_instruction(&goal)?;
    store.append_history(&goal)?;

    let result = extractor.extract(&request, &observers).await?;
    info!(
        "Extraction {} finished with {} record(s)",
        result.metadata.request_id,
        result.records.len()
    );

    println!("{}", formatter.format_records(&result.records)?);
    eprintln!("{}", formatter.extraction_summary(&result));

    let analysis = if args.analyze {
        let client = AnalysisClient::new(provider, config.extractor.analysis.clone());
        let analysis = client
            .analyze_with_progress(&result.records, &observers)
            .await;
        println!("{}", formatter.format_analysis(&analysis)?);
        Some(analysis)
    } else {
        None
    };

    store.save_session(&result.records, analysis.as_ref())?;
    Ok(())
}

/// The goal from the command line, else the last instruction.
fn resolve_goal(goal: Option<&str>, store: &SessionStore) -> Result<String> {
    match goal.map(str::trim).filter(|g| !g.is_empty()) {
        Some(goal) => Ok(goal.to_string()),
        None => store.last_instruction().ok_or_else(|| {
            CliError::InvalidInput("No goal given and no previous instruction to reuse".into())
        }),
    }
}

fn build_request(goal: &str, args: &ExtractArgs) -> Result<ExtractionRequest> {
    let speed = if args.fast {
        ModelSpeed::Fast
    } else {
        ModelSpeed::Thorough
    };
    let mut request = ExtractionRequest::new(goal).with_speed(speed);

    if let Some(text) = &args.text {
        request = request.with_text(text.as_str());
    } else if let Some(source) = &args.text_file {
        request = request.with_text(read_text(source)?);
    }

    for file in &args.files {
        request = request.with_document(read_document(Path::new(file))?);
    }

    Ok(request)
}

fn read_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let data = std::fs::read(path)
        .map_err(|e| CliError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(mime_for(path), data, name))
}

/// MIME type from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown",
        _ => "application/octet-stream",
    }
}
