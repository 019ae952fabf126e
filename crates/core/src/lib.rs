//! Core data model for copywatch
//!
//! This crate provides:
//! - The positional fingerprint used to name backups
//! - Snapshot entries and the snapshot map
//! - Snapshot diffing into change records
//! - The fingerprint-named backup store
//! - Best-effort probes (line counting) that degrade instead of failing

pub mod diff;
pub mod hash;
pub mod lines;
pub mod probe;
pub mod store;
pub mod tree;

// Re-exports
pub use diff::{diff, ChangeRecord};
pub use hash::{fingerprint_bytes, fingerprint_file, Fingerprint, FingerprintHasher};
pub use lines::count_lines;
pub use probe::Probe;
pub use store::{BackupError, BackupRecord, BackupStore, DEFAULT_BACKUP_DIR};
pub use tree::{Entry, FileMeta, Snapshot, SnapshotWarning};
