//! Watch session: check cycles over one root
//!
//! Each [`WatchSession::check_for_changes`] call walks the tree, diffs it
//! against the previous cycle, appends directory and deletion notices right
//! away and hands new files to the backup pipeline. The session itself never
//! fails; problems are logged and show up as missing messages.

use crate::config::WatchConfig;
use crate::debounce::Stabilizer;
use crate::ignore::ExclusionRules;
use crate::pipeline::{BackupPipeline, ShutdownReport};
use crate::snapshot::{Snapshotter, WalkOptions};
use copywatch_core::{diff, BackupStore, ChangeRecord, Snapshot};
use copywatch_journal::{Journal, Notice};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What one call to [`WatchSession::check_for_changes`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Finalizing flag was set; nothing was inspected
    Skipped,
    /// A full cycle ran
    Completed {
        /// Change records found by the diff
        changes: usize,
        /// Backup jobs handed to the pipeline
        dispatched: usize,
    },
}

/// Watches one directory tree and backs up new files
pub struct WatchSession {
    root: PathBuf,
    config: WatchConfig,
    snapshotter: Snapshotter,
    previous: Snapshot,
    store: BackupStore,
    journal: Arc<Journal>,
    pipeline: Option<BackupPipeline>,
}

impl WatchSession {
    /// Start a session with default configuration
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_config(root, WatchConfig::default())
    }

    /// Start a session
    ///
    /// Creates the backup directory, records the initial tree and starts the
    /// backup workers. An invalid config is logged and replaced by defaults.
    pub fn with_config(root: impl AsRef<Path>, config: WatchConfig) -> Self {
        let root = absolute_root(root.as_ref());

        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Invalid watch config ({}); using defaults", e);
                WatchConfig::default()
            }
        };

        let store = BackupStore::new(root.join(&config.backup_dir_name));
        if let Err(e) = store.ensure_dir() {
            warn!("Could not create backup folder: {}", e);
        }

        let options = WalkOptions {
            include_directories: config.include_directories,
            ..WalkOptions::existence()
        };
        let snapshotter = Snapshotter::new(&root, ExclusionRules::for_root(&root, &config), options);
        let previous = snapshotter.capture();

        let journal = Arc::new(Journal::new());
        let pipeline = match BackupPipeline::start(
            Stabilizer::new(config.stabilize.to_config()),
            store.clone(),
            Arc::clone(&journal),
            config.worker_threads,
        ) {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                warn!("Backup workers unavailable, new files will not be backed up: {}", e);
                None
            }
        };

        info!(
            "Watching {} ({} known paths, backups in {})",
            root.display(),
            previous.len(),
            store.dir().display()
        );

        Self {
            root,
            config,
            snapshotter,
            previous,
            store,
            journal,
            pipeline,
        }
    }

    /// Run one check cycle
    pub fn check_for_changes(&mut self) -> CycleOutcome {
        if self.journal.is_finalizing() {
            debug!("Finalizing; skipping check of {}", self.root.display());
            return CycleOutcome::Skipped;
        }

        let current = self.snapshotter.capture();
        let changes = diff(&self.previous, &current);

        let mut new_files = Vec::new();
        for change in &changes {
            match change {
                ChangeRecord::NewFile { path, .. } => new_files.push(path.clone()),
                ChangeRecord::NewDirectory { path } => {
                    self.journal.record(&Notice::DirectoryCopied { path: path.clone() });
                }
                ChangeRecord::DeletedFile { path, .. } => {
                    self.journal.record(&Notice::FileDeleted { path: path.clone() });
                }
                ChangeRecord::DeletedDirectory { path } => {
                    self.journal.record(&Notice::DirectoryDeleted { path: path.clone() });
                }
                ChangeRecord::Modified { .. } => {}
            }
        }

        let mut dispatched = 0;
        for path in new_files {
            match self.pipeline {
                Some(ref pipeline) => {
                    if pipeline.dispatch(path) {
                        dispatched += 1;
                    }
                }
                None => warn!("New file {} not backed up: no backup workers", path.display()),
            }
        }

        self.previous = current;

        if !changes.is_empty() {
            info!("{} change(s), {} backup(s) queued", changes.len(), dispatched);
        }
        CycleOutcome::Completed {
            changes: changes.len(),
            dispatched,
        }
    }

    /// Pause or resume detection
    pub fn set_finalizing(&self, finalizing: bool) {
        self.journal.set_finalizing(finalizing);
    }

    /// Check if detection is paused
    pub fn is_finalizing(&self) -> bool {
        self.journal.is_finalizing()
    }

    /// Copy of every message so far
    pub fn drain_messages(&self) -> Vec<String> {
        self.journal.messages()
    }

    /// Shared handle to the message log, for readers on other threads
    pub fn journal(&self) -> Arc<Journal> {
        Arc::clone(&self.journal)
    }

    /// Directory receiving backups
    pub fn backup_folder(&self) -> &Path {
        self.store.dir()
    }

    /// Watched root (absolute)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration in effect
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Paths known after the last cycle, sorted
    pub fn known_paths(&self) -> Vec<PathBuf> {
        self.previous.sorted_paths().into_iter().cloned().collect()
    }

    /// Backups dispatched but not finished
    pub fn pending_backups(&self) -> usize {
        self.pipeline.as_ref().map_or(0, BackupPipeline::in_flight)
    }

    /// Block until no backup is in flight or `timeout` elapses
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pipeline.as_ref().map_or(true, |p| p.wait_idle(timeout))
    }

    /// Stop the backup workers, waiting up to the configured grace period
    pub fn shutdown(mut self) -> ShutdownReport {
        let grace = self.config.shutdown_grace();
        let report = match self.pipeline.take() {
            Some(pipeline) => pipeline.shutdown(grace),
            None => ShutdownReport {
                drained: true,
                ..ShutdownReport::default()
            },
        };
        info!(
            "Session stopped: {} backup(s) completed, {} abandoned",
            report.completed, report.abandoned
        );
        report
    }
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("root", &self.root)
            .field("known", &self.previous.len())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

fn absolute_root(root: &Path) -> PathBuf {
    match std::path::absolute(root) {
        Ok(path) => path,
        Err(e) => {
            warn!("Could not resolve {}: {}", root.display(), e);
            root.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quick_config() -> WatchConfig {
        let mut config = WatchConfig::default();
        config.stabilize.interval_ms = 20;
        config
    }

    #[test]
    fn test_construction_creates_backup_folder() {
        let temp_dir = TempDir::new().unwrap();
        let session = WatchSession::new(temp_dir.path());

        assert!(session.root().is_absolute());
        assert_eq!(session.backup_folder(), session.root().join(".copywatcher_backup"));
        assert!(session.backup_folder().is_dir());
        assert!(session.known_paths().is_empty());
    }

    #[test]
    fn test_existing_tree_is_baseline() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub/a.txt"), "x").unwrap();

        let mut session = WatchSession::with_config(temp_dir.path(), quick_config());
        assert_eq!(session.known_paths().len(), 2);
        assert_eq!(
            session.check_for_changes(),
            CycleOutcome::Completed {
                changes: 0,
                dispatched: 0
            }
        );
        assert!(session.drain_messages().is_empty());
    }

    #[test]
    fn test_directory_notices_are_synchronous() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = WatchSession::with_config(temp_dir.path(), quick_config());

        fs::create_dir(temp_dir.path().join("docs")).unwrap();
        session.check_for_changes();
        let messages = session.drain_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("DIRECTORY COPIED:"));

        fs::remove_dir(temp_dir.path().join("docs")).unwrap();
        session.check_for_changes();
        let messages = session.drain_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].contains("DIRECTORY DELETED:"));
    }

    #[test]
    fn test_directories_ignored_when_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = WatchConfig {
            include_directories: false,
            ..quick_config()
        };
        let mut session = WatchSession::with_config(temp_dir.path(), config);

        fs::create_dir(temp_dir.path().join("docs")).unwrap();
        assert_eq!(
            session.check_for_changes(),
            CycleOutcome::Completed {
                changes: 0,
                dispatched: 0
            }
        );
    }

    #[test]
    fn test_modification_produces_no_session_notice() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        let mut session = WatchSession::with_config(temp_dir.path(), quick_config());

        fs::write(&file, "hello world").unwrap();
        let outcome = session.check_for_changes();

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                changes: 1,
                dispatched: 0
            }
        );
        assert!(session.drain_messages().is_empty());
    }

    #[test]
    fn test_finalizing_skips_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = WatchSession::with_config(temp_dir.path(), quick_config());
        session.set_finalizing(true);
        assert!(session.is_finalizing());

        fs::write(temp_dir.path().join("a.txt"), "x").unwrap();
        assert_eq!(session.check_for_changes(), CycleOutcome::Skipped);
        assert!(session.known_paths().is_empty());

        session.set_finalizing(false);
        assert_eq!(
            session.check_for_changes(),
            CycleOutcome::Completed {
                changes: 1,
                dispatched: 1
            }
        );
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = WatchConfig {
            worker_threads: 0,
            ..WatchConfig::default()
        };
        let session = WatchSession::with_config(temp_dir.path(), config);
        assert_eq!(session.config(), &WatchConfig::default());
    }

    #[test]
    fn test_drop_without_shutdown_does_not_block() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = WatchSession::with_config(temp_dir.path(), WatchConfig::default());
        fs::write(temp_dir.path().join("a.txt"), "x").unwrap();
        session.check_for_changes();
        assert_eq!(session.pending_backups(), 1);
        drop(session);
    }
}
