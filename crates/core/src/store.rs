//! Backup directory management
//!
//! Every new file is copied once into the backup directory as
//! `<fingerprint>_<file name>`. A later copy with the same name replaces
//! the earlier one.

use crate::hash::Fingerprint;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default backup directory name, created directly under the watched root
pub const DEFAULT_BACKUP_DIR: &str = ".copywatcher_backup";

/// Errors raised while writing a backup
#[derive(Debug, Error)]
pub enum BackupError {
    /// The source disappeared before it could be copied
    #[error("source file vanished before backup: {0}")]
    SourceMissing(PathBuf),

    /// The source path has no file name component
    #[error("cannot derive a backup name for {0}")]
    NoFileName(PathBuf),

    /// Any other I/O failure
    #[error("backup of {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A completed backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// File that was copied
    pub source: PathBuf,
    /// Fingerprint used in the backup name
    pub fingerprint: Fingerprint,
    /// Location of the copy
    pub backup_path: PathBuf,
}

/// Flat directory of fingerprint-named file copies
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Create a store rooted at `dir` (nothing is touched on disk yet)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the backup directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| BackupError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Backup directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name a backup of `source` would get
    pub fn backup_name(fingerprint: Fingerprint, source: &Path) -> Option<String> {
        let name = source.file_name()?.to_string_lossy();
        Some(format!("{}_{}", fingerprint, name))
    }

    /// Full path a backup of `source` would get
    pub fn backup_path(&self, fingerprint: Fingerprint, source: &Path) -> Option<PathBuf> {
        Self::backup_name(fingerprint, source).map(|name| self.dir.join(name))
    }

    /// Copy `source` into the store, replacing any same-named backup
    pub fn backup(&self, source: &Path, fingerprint: Fingerprint) -> Result<BackupRecord, BackupError> {
        let backup_path = self
            .backup_path(fingerprint, source)
            .ok_or_else(|| BackupError::NoFileName(source.to_path_buf()))?;

        match std::fs::copy(source, &backup_path) {
            Ok(bytes) => {
                tracing::debug!(
                    "Backed up {} ({} bytes) to {}",
                    source.display(),
                    bytes,
                    backup_path.display()
                );
                Ok(BackupRecord {
                    source: source.to_path_buf(),
                    fingerprint,
                    backup_path,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
                Err(BackupError::SourceMissing(source.to_path_buf()))
            }
            Err(source_err) => Err(BackupError::Io {
                path: source.to_path_buf(),
                source: source_err,
            }),
        }
    }
}
