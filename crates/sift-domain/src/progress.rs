//! Progress reporting for long-running extraction and analysis calls

use std::fmt;

/// Phase of a processing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgressPhase {
    /// Nothing running
    #[default]
    Idle,

    /// Records are being extracted
    Extracting,

    /// Records are being analyzed
    Analyzing,

    /// Finished successfully
    Complete,

    /// Finished with an error
    Error,
}

impl ProgressPhase {
    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressPhase::Idle => "idle",
            ProgressPhase::Extracting => "extracting",
            ProgressPhase::Analyzing => "analyzing",
            ProgressPhase::Complete => "complete",
            ProgressPhase::Error => "error",
        }
    }
}

/// A single progress snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    /// Percentage in [0, 100], non-decreasing over one call
    pub percent: u8,

    /// Short human-readable status phrase
    pub status: String,

    /// Phase tag
    pub phase: ProgressPhase,
}

impl ProgressState {
    /// Create a new progress snapshot; the percentage is clamped to 100
    pub fn new(percent: u8, status: impl Into<String>, phase: ProgressPhase) -> Self {
        Self {
            percent: percent.min(100),
            status: status.into(),
            phase,
        }
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {} ({})", self.percent, self.status, self.phase.as_str())
    }
}

/// Receives progress snapshots during a processing call
///
/// Implementations must be cheap; they are invoked inline on the
/// orchestration task.
pub trait ProgressObserver: Send + Sync {
    /// Called for every progress update
    fn on_progress(&self, state: &ProgressState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_clamps() {
        let state = ProgressState::new(250, "done", ProgressPhase::Complete);
        assert_eq!(state.percent, 100);
    }

    #[test]
    fn test_progress_state_display() {
        let state = ProgressState::new(7, "Reading part 1 of 3", ProgressPhase::Extracting);
        assert_eq!(state.to_string(), "[  7%] Reading part 1 of 3 (extracting)");
    }
}
