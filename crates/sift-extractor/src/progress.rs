//! Progress tracking and fan-out to observers

use sift_domain::{ProgressObserver, ProgressPhase, ProgressState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Fans progress out to every observer and keeps the percentage monotonic
pub struct ProgressTracker<'a> {
    observers: &'a [&'a dyn ProgressObserver],
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    /// Create a tracker over zero or more observers
    pub fn new(observers: &'a [&'a dyn ProgressObserver]) -> Self {
        Self { observers, last: 0 }
    }

    /// Last reported percentage
    pub fn percent(&self) -> u8 {
        self.last
    }

    /// Report a snapshot; percentages below the last one are raised to it
    pub fn report(&mut self, percent: u8, status: impl Into<String>, phase: ProgressPhase) {
        self.last = percent.min(100).max(self.last);
        let state = ProgressState::new(self.last, status, phase);
        debug!("Progress {}", state);
        for observer in self.observers {
            observer.on_progress(&state);
        }
    }

    /// Report an `Error`-phase snapshot at the last reached percentage
    pub fn fail(&mut self, status: impl Into<String>) {
        self.report(self.last, status, ProgressPhase::Error);
    }
}

/// Linear interpolation between `floor` and `ceiling` after `done` of `total` chunks
pub fn chunk_percent(floor: u8, ceiling: u8, done: usize, total: usize) -> u8 {
    if total == 0 || ceiling <= floor {
        return floor;
    }
    let span = usize::from(ceiling - floor);
    let step = span * done.min(total) / total;
    floor + step as u8
}

/// Forwards progress snapshots into a tokio channel
///
/// A closed receiver is ignored; progress is advisory.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<ProgressState>,
}

impl ChannelObserver {
    /// Create an observer that sends into the given channel
    pub fn new(tx: UnboundedSender<ProgressState>) -> Self {
        Self { tx }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, state: &ProgressState) {
        let _ = self.tx.send(state.clone());
    }
}
