//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::Value;
use sift_domain::record::{display_value, field_names};
use sift_domain::{AnalysisResult, ProgressObserver, ProgressPhase, ProgressState, Record};
use sift_extractor::{ExtractionResult, ExtractionStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format records output.
    pub fn format_records(&self, records: &[Record]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_records_json(records),
            OutputFormat::Table => self.format_records_table(records),
            OutputFormat::Quiet => self.format_records_quiet(records),
        }
    }

    /// Format records as JSON.
    fn format_records_json(&self, records: &[Record]) -> Result<String> {
        let array = Value::Array(records.iter().cloned().map(Value::Object).collect());
        Ok(serde_json::to_string_pretty(&array)?)
    }

    /// Format records as a table, one column per field.
    fn format_records_table(&self, records: &[Record]) -> Result<String> {
        if records.is_empty() {
            return Ok(self.colorize("No records found.", "yellow"));
        }

        let columns = field_names(records);
        let mut builder = Builder::default();
        builder.push_record(columns.iter().map(String::as_str));

        for record in records {
            builder.push_record(
                columns
                    .iter()
                    .map(|c| record.get(c).map(display_value).unwrap_or_default()),
            );
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format records in quiet mode (one compact JSON object per line).
    fn format_records_quiet(&self, records: &[Record]) -> Result<String> {
        let lines = records
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Format an analysis result.
    pub fn format_analysis(&self, analysis: &AnalysisResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
            OutputFormat::Quiet => Ok(analysis.summary.clone()),
            OutputFormat::Table => {
                let mut out = String::new();
                out.push_str(&self.colorize("Summary", "cyan"));
                out.push('\n');
                out.push_str(&analysis.summary);
                out.push_str(&format!(
                    "\n\n{} {}\n",
                    self.colorize("Sentiment:", "cyan"),
                    self.sentiment(analysis.sentiment.as_str())
                ));
                self.push_section(&mut out, "Key entities", &analysis.key_entities);
                self.push_section(&mut out, "Suggested actions", &analysis.suggested_actions);
                self.push_section(&mut out, "Observations", &analysis.heuristic_analysis);
                Ok(out.trim_end().to_string())
            }
        }
    }

    fn push_section(&self, out: &mut String, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        out.push('\n');
        out.push_str(&self.colorize(title, "cyan"));
        out.push('\n');
        for item in items {
            out.push_str(&format!("  • {}\n", item));
        }
    }

    /// One-line summary of an extraction run.
    pub fn extraction_summary(&self, result: &ExtractionResult) -> String {
        let meta = &result.metadata;
        match result.status {
            ExtractionStatus::NoRecordsFound => self.warning(&format!(
                "No matching records found ({} chunk(s), {} call(s), {} ms)",
                meta.chunk_count, meta.oracle_calls, meta.processing_time_ms
            )),
            ExtractionStatus::Complete => self.success(&format!(
                "Extracted {} record(s) via {} ({} chunk(s), {} call(s), {} ms)",
                result.records.len(),
                meta.strategy,
                meta.chunk_count,
                meta.oracle_calls,
                meta.processing_time_ms
            )),
        }
    }

    /// Format the instruction history, most recent first.
    pub fn format_history(&self, history: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(history)?),
            OutputFormat::Quiet => Ok(history.join("\n")),
            OutputFormat::Table => {
                if history.is_empty() {
                    return Ok(self.info("No instructions yet"));
                }
                let lines: Vec<String> = history
                    .iter()
                    .enumerate()
                    .map(|(i, h)| format!("{:>3}  {}", i + 1, h))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn sentiment(&self, sentiment: &str) -> String {
        match sentiment {
            "positive" => self.colorize(sentiment, "green"),
            "negative" => self.colorize(sentiment, "red"),
            _ => sentiment.to_string(),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Prints progress snapshots on stderr.
pub struct StderrProgress {
    color_enabled: bool,
}

impl StderrProgress {
    /// Create a new stderr progress printer.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }
}

impl ProgressObserver for StderrProgress {
    fn on_progress(&self, state: &ProgressState) {
        let line = state.to_string();
        if !self.color_enabled {
            eprintln!("{}", line);
            return;
        }
        match state.phase {
            ProgressPhase::Error => eprintln!("{}", line.red()),
            ProgressPhase::Complete => eprintln!("{}", line.green()),
            _ => eprintln!("{}", line.dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        vec![
            json!({"name": "Alice", "zip": "02139"}).as_object().cloned().unwrap(),
            json!({"name": "Bob", "paid": true}).as_object().cloned().unwrap(),
        ]
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_records(&records()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert!(output.contains("\"02139\""));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_records(&records()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('{'));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&records()).unwrap();
        assert!(output.contains("name"));
        assert!(output.contains("zip"));
        assert!(output.contains("paid"));
        assert!(output.contains("02139"));
        assert!(output.contains("Bob"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[]).unwrap();
        assert!(output.contains("No records found"));
    }

    #[test]
    fn test_analysis_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut analysis = AnalysisResult::placeholder("offline");
        analysis.key_entities = vec!["Acme".to_string()];

        let output = formatter.format_analysis(&analysis).unwrap();
        assert!(output.contains("Summary"));
        assert!(output.contains("Sentiment: neutral"));
        assert!(output.contains("• Acme"));
        assert!(!output.contains("Suggested actions"));
    }

    #[test]
    fn test_analysis_json_uses_camel_case() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_analysis(&AnalysisResult::placeholder("offline"))
            .unwrap();
        assert!(output.contains("heuristicAnalysis"));
    }

    #[test]
    fn test_history_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_history(&["b".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(output, "  1  b\n  2  a");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
