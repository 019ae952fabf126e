//! Detailed change monitor
//!
//! Tracks size and line counts of every file under a root and reports
//! creations, modifications and deletions with their deltas. Unlike
//! [`crate::WatchSession`] it never copies anything.

use crate::config::WatchConfig;
use crate::ignore::ExclusionRules;
use crate::snapshot::{Snapshotter, WalkOptions};
use chrono::Local;
use copywatch_core::{diff, ChangeRecord, Entry, Snapshot};
use copywatch_journal::Notice;
use std::path::{Path, PathBuf};

/// Polling change reporter for one root
#[derive(Debug)]
pub struct ChangeMonitor {
    snapshotter: Snapshotter,
    previous: Snapshot,
}

impl ChangeMonitor {
    /// Monitor `root` with the standard session exclusions
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let rules = ExclusionRules::for_root(&root, &WatchConfig::default());
        Self::with_rules(root, rules)
    }

    /// Monitor `root` with custom exclusions
    pub fn with_rules(root: impl Into<PathBuf>, rules: ExclusionRules) -> Self {
        let snapshotter = Snapshotter::new(root, rules, WalkOptions::detailed());
        let previous = snapshotter.capture();
        Self {
            snapshotter,
            previous,
        }
    }

    /// Monitored root
    pub fn root(&self) -> &Path {
        self.snapshotter.root()
    }

    /// Diff the tree against the last check and remember the new state
    pub fn changes(&mut self) -> Vec<ChangeRecord> {
        let current = self.snapshotter.capture();
        let changes = diff(&self.previous, &current);
        self.previous = current;
        changes
    }

    /// Rendered notices for one check; empty when nothing changed
    pub fn check_detailed(&mut self) -> Vec<String> {
        let now = Local::now();
        self.changes()
            .iter()
            .map(|change| Notice::detailed(change).render(&now))
            .collect()
    }

    /// Check if anything changed since the last check
    pub fn check_change(&mut self) -> bool {
        !self.changes().is_empty()
    }

    /// Listing of every file currently under the root
    ///
    /// Reads the tree afresh; the baseline used by [`Self::changes`] is not
    /// touched.
    pub fn initial_listing(&self) -> Vec<String> {
        let root = self.snapshotter.root();
        let snapshot = self.snapshotter.capture();

        let mut lines = vec![format!("=== Initial folder snapshot: {} ===", root.display())];
        for warning in snapshot.warnings().iter().filter(|w| w.omitted) {
            if warning.path == root {
                lines.push(format!("Error reading folder: {}", warning.reason));
            } else {
                lines.push(format!("Could not read file: {}", warning.path.display()));
            }
        }
        for path in snapshot.sorted_paths() {
            if let Some(Entry::File(meta)) = snapshot.get(path) {
                lines.push(format!(
                    "File: {} | Size: {} bytes | Lines: {}",
                    path.display(),
                    meta.size,
                    meta.line_count
                ));
            }
        }
        lines.push("=== End of snapshot ===".to_string());
        lines
    }
}
