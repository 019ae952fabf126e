//! Full-tree snapshot walker
//!
//! Walks the watched root on every call and records one entry per visible
//! path. Nothing here fails: unreadable directories and vanished entries are
//! logged, noted on the snapshot, and left out.

use crate::ignore::ExclusionRules;
use copywatch_core::{count_lines, Entry, FileMeta, Snapshot};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What a walk records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Record directories as entries
    pub include_directories: bool,
    /// Read file content to count lines
    pub probe_content: bool,
}

impl WalkOptions {
    /// Files only, with line counts
    pub fn detailed() -> Self {
        Self {
            include_directories: false,
            probe_content: true,
        }
    }

    /// Files and directories, no content reads
    pub fn existence() -> Self {
        Self {
            include_directories: true,
            probe_content: false,
        }
    }
}

/// Builds snapshots of one root
#[derive(Debug, Clone)]
pub struct Snapshotter {
    root: PathBuf,
    rules: ExclusionRules,
    options: WalkOptions,
}

impl Snapshotter {
    /// Create a snapshotter
    pub fn new(root: impl Into<PathBuf>, rules: ExclusionRules, options: WalkOptions) -> Self {
        Self {
            root: root.into(),
            rules,
            options,
        }
    }

    /// Watched root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and capture a snapshot
    pub fn capture(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !self.rules.is_excluded(e.path(), e.file_type().is_dir()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    warn!("Skipping unreadable path {}: {}", path.display(), e);
                    snapshot.warn(path, e.to_string(), true);
                    continue;
                }
            };

            let metadata = match resolve_metadata(&entry) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Could not read file: {}: {}", entry.path().display(), e);
                    snapshot.warn(entry.path(), e.to_string(), true);
                    continue;
                }
            };

            if metadata.is_dir() {
                if self.options.include_directories {
                    snapshot.insert(entry.into_path(), Entry::Directory);
                }
                continue;
            }
            if !metadata.is_file() {
                debug!("Skipping special file {}", entry.path().display());
                continue;
            }

            let line_count = if self.options.probe_content {
                let probe = count_lines(entry.path());
                if let Some(reason) = probe.reason() {
                    debug!("Line count degraded: {}", reason);
                    snapshot.warn(entry.path(), reason, false);
                }
                probe.into_value()
            } else {
                0
            };

            let meta = FileMeta::new(metadata.len(), line_count, to_unix_millis(metadata.modified().ok()));
            snapshot.insert(entry.into_path(), Entry::File(meta));
        }

        debug!(
            "Captured {} entries under {} ({} warnings)",
            snapshot.len(),
            self.root.display(),
            snapshot.warnings().len()
        );
        snapshot
    }
}

/// Metadata of the entry, or of its target when it is a symlink
///
/// Links are recorded as what they point to. Linked directories are not
/// descended into.
fn resolve_metadata(entry: &walkdir::DirEntry) -> std::io::Result<Metadata> {
    if entry.path_is_symlink() {
        return fs::metadata(entry.path());
    }
    entry.metadata().map_err(std::io::Error::from)
}

fn to_unix_millis(t: Option<SystemTime>) -> i64 {
    match t {
        Some(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        },
        None => 0,
    }
}
