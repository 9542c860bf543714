//! Oracle directives and prompt assembly

use serde_json::Value;
use sift_domain::Record;

/// Fixed system directive for every extraction call
pub const EXTRACTION_DIRECTIVE: &str = r#"You are a precise data extraction engine.
Read the supplied documents and text and extract every record that matches the user's goal.

Rules:
- Output ONLY a JSON array of flat objects. Each object is one record.
- Field values must be scalars: string, number, boolean or null. Do not nest objects or arrays.
- Numeric strings with leading zeros (for example "007" or "00123") must stay strings.
- Identifiers, codes, account numbers, postal codes and phone numbers are always strings.
- Use null for a field that is missing in a record. Do not invent values.
- Use the same field names for every record.
- Never wrap the output in prose, explanations or Markdown code fences.
- If the input is only part of a larger document, extract only records that are complete within it.
- If nothing matches the goal, output an empty array: []"#;

/// Fixed system directive for the analysis phase
pub const ANALYSIS_DIRECTIVE: &str = r#"You are a senior data analyst.
You receive a JSON array of records extracted from documents. Analyze them and answer with a single JSON object:

{
  "summary": "a short narrative overview of the data",
  "sentiment": "positive" | "neutral" | "negative",
  "keyEntities": ["the most important people, organizations, products or values"],
  "suggestedActions": ["concrete next steps a reader could take"],
  "heuristicAnalysis": ["patterns, anomalies, outliers or data quality issues"]
}

Output ONLY the JSON object, no prose and no Markdown code fences."#;

/// Instruction text sent with one extraction call
///
/// When the call covers one chunk of a larger input, a notice tells the oracle
/// it sees a partial view and must only emit records complete within it.
pub fn extraction_instruction(goal: &str, chunk: Option<(usize, usize)>) -> String {
    let mut instruction = format!("Extraction goal: {}", goal);

    if let Some((index, total)) = chunk {
        instruction.push_str(&format!(
            "\n\nThis input is part {} of {} of a larger source. \
             Extract only records that are complete within this part; \
             skip records cut off at its start or end.",
            index + 1,
            total
        ));
    }

    instruction
}

/// Serialize at most `limit` records as the analysis payload
pub fn analysis_payload(records: &[Record], limit: usize) -> String {
    let slice = &records[..records.len().min(limit)];
    let array = Value::Array(slice.iter().cloned().map(Value::Object).collect());

    let mut payload = String::new();
    if records.len() > slice.len() {
        payload.push_str(&format!(
            "Showing the first {} of {} records.\n",
            slice.len(),
            records.len()
        ));
    }
    payload.push_str("Records:\n");
    payload.push_str(&array.to_string());
    payload
}
