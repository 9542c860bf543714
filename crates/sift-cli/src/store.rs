//! File-backed session state under `~/.sift/`.
//!
//! Two JSON files are kept: `state.json` (last instruction, instruction
//! history, preferred output format) and `session.json` (the last record set
//! and its analysis). A store without a directory is a no-op that returns
//! empty values, so the CLI keeps working when no home directory exists.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sift_domain::{AnalysisResult, Record};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum number of remembered instructions
pub const HISTORY_LIMIT: usize = 10;

const STATE_FILE: &str = "state.json";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    last_instruction: Option<String>,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default)]
    preferred_format: Option<OutputFormat>,
}

/// The last saved record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Extracted records
    pub records: Vec<Record>,

    /// Analysis of the records, if one was run
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

/// Persists the last session and instruction history.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: Option<PathBuf>,
}

impl SessionStore {
    /// Store backed by the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Store that persists nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Store under `~/.sift/`, or a disabled store without a home directory.
    pub fn open_default() -> Self {
        match Config::home_dir() {
            Ok(dir) => Self::new(dir),
            Err(e) => {
                warn!("Session state disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Last instruction submitted.
    pub fn last_instruction(&self) -> Option<String> {
        self.load_state().last_instruction
    }

    /// Remember the last instruction.
    pub fn set_last_instruction(&self, instruction: &str) -> Result<()> {
        self.update_state(|state| state.last_instruction = Some(instruction.to_string()))
    }

    /// Past instructions, most recent first.
    pub fn instruction_history(&self) -> Vec<String> {
        self.load_state().history
    }

    /// Add an instruction to the history.
    ///
    /// The history is deduplicated, most recent first, and bounded to
    /// [`HISTORY_LIMIT`] entries. Blank instructions are ignored.
    pub fn append_history(&self, instruction: &str) -> Result<()> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Ok(());
        }

        self.update_state(|state| {
            state.history.retain(|h| h != instruction);
            state.history.insert(0, instruction.to_string());
            state.history.truncate(HISTORY_LIMIT);
        })
    }

    /// Forget all past instructions.
    pub fn clear_history(&self) -> Result<()> {
        self.update_state(|state| state.history.clear())
    }

    /// Output format chosen last time one was given explicitly.
    pub fn preferred_format(&self) -> Option<OutputFormat> {
        self.load_state().preferred_format
    }

    /// Remember the output format.
    pub fn set_preferred_format(&self, format: OutputFormat) -> Result<()> {
        self.update_state(|state| state.preferred_format = Some(format))
    }

    /// Save the record set and its analysis, replacing the previous session.
    pub fn save_session(&self, records: &[Record], analysis: Option<&AnalysisResult>) -> Result<()> {
        let Some(path) = self.file(SESSION_FILE) else {
            return Ok(());
        };

        let session = Session {
            records: records.to_vec(),
            analysis: analysis.cloned(),
        };
        write_json(&path, &session)?;
        debug!("Saved session with {} record(s) to {}", records.len(), path.display());
        Ok(())
    }

    /// Load the last saved session, if any.
    pub fn load_session(&self) -> Result<Option<Session>> {
        let Some(path) = self.file(SESSION_FILE) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn file(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(name))
    }

    fn load_state(&self) -> State {
        let Some(path) = self.file(STATE_FILE) else {
            return State::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable {}: {}", path.display(), e);
                State::default()
            }),
            Err(_) => State::default(),
        }
    }

    fn update_state(&self, f: impl FnOnce(&mut State)) -> Result<()> {
        let Some(path) = self.file(STATE_FILE) else {
            return Ok(());
        };

        let mut state = self.load_state();
        f(&mut state);
        write_json(&path, &state)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
