//! Append-only message log shared with background workers

use crate::notice::Notice;
use chrono::Local;
use parking_lot::Mutex;

/// State guarded by the journal lock
#[derive(Debug, Default)]
struct JournalState {
    /// Rendered messages, in append order
    messages: Vec<String>,
    /// Detection paused while an external teardown runs
    finalizing: bool,
}

/// Insertion-ordered message log
///
/// The finalizing flag lives under the same lock as the messages, so a
/// reader never observes one without the other being consistent.
#[derive(Debug, Default)]
pub struct Journal {
    state: Mutex<JournalState>,
}

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `notice` with the current local time and append it
    ///
    /// Returns the appended line.
    pub fn record(&self, notice: &Notice) -> String {
        let line = notice.render(&Local::now());
        tracing::info!("{}", line);
        self.append(line.clone());
        line
    }

    /// Append an already rendered line
    pub fn append(&self, line: String) {
        self.state.lock().messages.push(line);
    }

    /// Copy of every message so far (the log is not cleared)
    pub fn messages(&self) -> Vec<String> {
        self.state.lock().messages.clone()
    }

    /// Number of messages so far
    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    /// Check if no message was recorded yet
    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    /// Set or clear the finalizing flag
    pub fn set_finalizing(&self, finalizing: bool) {
        self.state.lock().finalizing = finalizing;
    }

    /// Current finalizing flag
    pub fn is_finalizing(&self) -> bool {
        self.state.lock().finalizing
    }
}
