//! Classification of changes between two snapshots

use crate::tree::{Entry, FileMeta, Snapshot};
use std::path::{Path, PathBuf};

/// One detected change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord {
    /// File absent from the previous snapshot
    NewFile { path: PathBuf, meta: FileMeta },
    /// Directory absent from the previous snapshot
    NewDirectory { path: PathBuf },
    /// File present in both snapshots with different metadata
    Modified {
        path: PathBuf,
        before: FileMeta,
        after: FileMeta,
    },
    /// File absent from the current snapshot
    DeletedFile { path: PathBuf, meta: FileMeta },
    /// Directory absent from the current snapshot
    DeletedDirectory { path: PathBuf },
}

impl ChangeRecord {
    /// Path the change refers to
    pub fn path(&self) -> &Path {
        match self {
            ChangeRecord::NewFile { path, .. }
            | ChangeRecord::NewDirectory { path }
            | ChangeRecord::Modified { path, .. }
            | ChangeRecord::DeletedFile { path, .. }
            | ChangeRecord::DeletedDirectory { path } => path,
        }
    }

    /// Signed byte delta for a modification
    pub fn size_delta(&self) -> Option<i64> {
        match self {
            ChangeRecord::Modified { before, after, .. } => {
                Some(after.size as i64 - before.size as i64)
            }
            _ => None,
        }
    }

    /// Signed line delta for a modification
    pub fn lines_delta(&self) -> Option<i64> {
        match self {
            ChangeRecord::Modified { before, after, .. } => {
                Some(after.line_count as i64 - before.line_count as i64)
            }
            _ => None,
        }
    }

    /// Check if this is a creation
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            ChangeRecord::NewFile { .. } | ChangeRecord::NewDirectory { .. }
        )
    }

    /// Check if this is a deletion
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            ChangeRecord::DeletedFile { .. } | ChangeRecord::DeletedDirectory { .. }
        )
    }
}

fn created(path: &Path, entry: &Entry) -> ChangeRecord {
    match entry {
        Entry::File(meta) => ChangeRecord::NewFile {
            path: path.to_path_buf(),
            meta: *meta,
        },
        Entry::Directory => ChangeRecord::NewDirectory {
            path: path.to_path_buf(),
        },
    }
}

fn deleted(path: &Path, entry: &Entry) -> ChangeRecord {
    match entry {
        Entry::File(meta) => ChangeRecord::DeletedFile {
            path: path.to_path_buf(),
            meta: *meta,
        },
        Entry::Directory => ChangeRecord::DeletedDirectory {
            path: path.to_path_buf(),
        },
    }
}

/// Compute the changes from `previous` to `current`
///
/// Creations and modifications come first, deletions last; each group is
/// sorted by path. A path whose kind flipped between file and directory is
/// reported as a deletion of the old kind plus a creation of the new one.
/// An empty vector means nothing changed.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<ChangeRecord> {
    let mut upserts = Vec::new();
    let mut removals = Vec::new();

    for (path, now) in current.iter() {
        match (previous.get(path), now) {
            (None, _) => upserts.push(created(path, now)),
            (Some(Entry::File(before)), Entry::File(after)) => {
                if before != after {
                    upserts.push(ChangeRecord::Modified {
                        path: path.clone(),
                        before: *before,
                        after: *after,
                    });
                }
            }
            (Some(Entry::Directory), Entry::Directory) => {}
            (Some(then), _) => {
                removals.push(deleted(path, then));
                upserts.push(created(path, now));
            }
        }
    }

    for (path, then) in previous.iter() {
        if !current.contains(path) {
            removals.push(deleted(path, then));
        }
    }

    upserts.sort_by(|a, b| a.path().cmp(b.path()));
    removals.sort_by(|a, b| a.path().cmp(b.path()));
    upserts.extend(removals);
    upserts
}
