//! Point-in-time view of a watched directory tree

use ahash::AHashMap;
use std::path::{Path, PathBuf};

/// Metadata tracked for a regular file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMeta {
    /// Length in bytes
    pub size: u64,
    /// Number of text lines (0 when unknown or binary)
    pub line_count: u64,
    /// Last modification time, milliseconds since the Unix epoch
    pub mtime_ms: i64,
}

impl FileMeta {
    /// Create file metadata
    pub fn new(size: u64, line_count: u64, mtime_ms: i64) -> Self {
        Self {
            size,
            line_count,
            mtime_ms,
        }
    }
}

/// Entry in a snapshot
///
/// Two entries are equal when both are files with identical metadata, or
/// both are directories. A change of kind is never an "equal" entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    /// Regular file
    File(FileMeta),
    /// Directory (no comparable attributes)
    Directory,
}

impl Entry {
    /// Create a file entry
    pub fn file(size: u64, line_count: u64, mtime_ms: i64) -> Self {
        Entry::File(FileMeta::new(size, line_count, mtime_ms))
    }

    /// Check if this entry is a directory
    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Directory)
    }

    /// File metadata, if this is a file
    pub fn file_meta(&self) -> Option<&FileMeta> {
        match self {
            Entry::File(meta) => Some(meta),
            Entry::Directory => None,
        }
    }
}

/// A path that could not be captured accurately during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWarning {
    /// Offending path
    pub path: PathBuf,
    /// What went wrong
    pub reason: String,
    /// Whether the path was left out of the snapshot entirely
    pub omitted: bool,
}

/// Mapping from absolute path to entry, captured in one walk
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: AHashMap<PathBuf, Entry>,
    warnings: Vec<SnapshotWarning>,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, path: impl Into<PathBuf>, entry: Entry) {
        self.entries.insert(path.into(), entry);
    }

    /// Get an entry
    pub fn get(&self, path: &Path) -> Option<&Entry> {
        self.entries.get(path)
    }

    /// Check whether a path is present
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Iterate over entries in map order
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Entry)> {
        self.entries.iter()
    }

    /// Paths sorted lexicographically
    pub fn sorted_paths(&self) -> Vec<&PathBuf> {
        let mut paths: Vec<_> = self.entries.keys().collect();
        paths.sort();
        paths
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a warning raised while building the snapshot
    pub fn warn(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>, omitted: bool) {
        self.warnings.push(SnapshotWarning {
            path: path.into(),
            reason: reason.into(),
            omitted,
        });
    }

    /// Warnings raised while building the snapshot
    pub fn warnings(&self) -> &[SnapshotWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_equality() {
        assert_eq!(Entry::file(5, 1, 100), Entry::file(5, 1, 100));
        assert_ne!(Entry::file(5, 1, 100), Entry::file(5, 1, 101));
        assert_ne!(Entry::file(5, 1, 100), Entry::file(5, 2, 100));
        assert_eq!(Entry::Directory, Entry::Directory);
        assert_ne!(Entry::file(0, 0, 0), Entry::Directory);
    }

    #[test]
    fn test_snapshot_insert_get() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.is_empty());

        snapshot.insert("/w/b.txt", Entry::file(1, 1, 1));
        snapshot.insert("/w/a", Entry::Directory);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(Path::new("/w/a")));
        assert!(snapshot.get(Path::new("/w/a")).unwrap().is_dir());
        assert_eq!(
            snapshot.sorted_paths(),
            vec![&PathBuf::from("/w/a"), &PathBuf::from("/w/b.txt")]
        );
    }

    #[test]
    fn test_warnings_are_kept() {
        let mut snapshot = Snapshot::new();
        snapshot.warn("/w/locked", "permission denied", true);

        assert_eq!(snapshot.warnings().len(), 1);
        assert!(snapshot.warnings()[0].omitted);
        assert!(snapshot.is_empty());
    }
}
