//! Background stabilize, fingerprint and backup pipeline
//!
//! Each new file gets its own task on a dedicated worker runtime, so a file
//! that keeps growing never holds up the check cycle or other backups.
//! Completed backups append a `FILE COPIED` notice to the shared journal.

use crate::debounce::Stabilizer;
use copywatch_core::{fingerprint_file, BackupError, BackupRecord, BackupStore};
use copywatch_journal::{Journal, Notice};
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result of a pipeline shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Every in-flight job finished within the grace period
    pub drained: bool,
    /// Jobs that ran to the end over the pipeline's lifetime
    pub completed: usize,
    /// Jobs still running when the grace period ran out
    pub abandoned: usize,
}

/// State shared with worker tasks
struct Shared {
    stabilizer: Stabilizer,
    store: BackupStore,
    journal: Arc<Journal>,
    in_flight: Mutex<usize>,
    idle: Condvar,
    completed: AtomicUsize,
}

impl Shared {
    fn fingerprint_and_copy(&self, path: &Path) -> Result<BackupRecord, BackupError> {
        let probe = fingerprint_file(path);
        if let Some(reason) = probe.reason() {
            warn!("Fingerprint degraded to seed: {}", reason);
        }
        self.store.backup(path, probe.into_value())
    }
}

/// Decrements the in-flight counter when a job ends, however it ends
struct InFlight(Arc<Shared>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut count = self.0.in_flight.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

/// Worker runtime plus bookkeeping for outstanding backups
pub struct BackupPipeline {
    runtime: Option<Runtime>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    accepting: AtomicBool,
}

impl BackupPipeline {
    /// Start the worker runtime
    pub fn start(
        stabilizer: Stabilizer,
        store: BackupStore,
        journal: Arc<Journal>,
        worker_threads: usize,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("copywatch-backup")
            .enable_time()
            .build()?;

        Ok(Self {
            runtime: Some(runtime),
            shared: Arc::new(Shared {
                stabilizer,
                store,
                journal,
                in_flight: Mutex::new(0),
                idle: Condvar::new(),
                completed: AtomicUsize::new(0),
            }),
            cancel: CancellationToken::new(),
            accepting: AtomicBool::new(true),
        })
    }

    /// Queue a new file for stabilization and backup
    ///
    /// Returns false if the pipeline is shutting down.
    pub fn dispatch(&self, path: PathBuf) -> bool {
        let runtime = match self.runtime {
            Some(ref runtime) if self.accepting.load(Ordering::Acquire) => runtime,
            _ => {
                warn!("Backup pipeline stopped; not backing up {}", path.display());
                return false;
            }
        };

        *self.shared.in_flight.lock() += 1;
        let guard = InFlight(Arc::clone(&self.shared));
        let cancel = self.cancel.child_token();

        debug!("Dispatching backup job for {}", path.display());
        runtime.spawn(run_job(guard, path, cancel));
        true
    }

    /// Jobs dispatched but not finished
    pub fn in_flight(&self) -> usize {
        *self.shared.in_flight.lock()
    }

    /// Block until no job is in flight, or `timeout` elapses
    ///
    /// Returns true if the pipeline went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.shared.in_flight.lock();
        while *count > 0 {
            if self.shared.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }

    /// Stop accepting jobs, wait up to `grace` for running ones, then
    /// cancel and abandon whatever is left
    pub fn shutdown(mut self, grace: Duration) -> ShutdownReport {
        self.accepting.store(false, Ordering::Release);

        let drained = self.wait_idle(grace);
        let mut abandoned = 0;
        if !drained {
            abandoned = self.in_flight();
            warn!("Cancelling {} backup job(s) still running after {:?}", abandoned, grace);
            self.cancel.cancel();
            // Cancelled stabilizers return at their next await point
            self.wait_idle(self.shared.stabilizer.config().interval);
        }

        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }

        ShutdownReport {
            drained,
            completed: self.shared.completed.load(Ordering::Acquire),
            abandoned,
        }
    }
}

impl Drop for BackupPipeline {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            self.cancel.cancel();
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for BackupPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupPipeline")
            .field("running", &self.runtime.is_some())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

async fn run_job(guard: InFlight, path: PathBuf, cancel: CancellationToken) {
    let shared = Arc::clone(&guard.0);

    match shared.stabilizer.wait(&path, &cancel).await {
        Ok(stable) => debug!(
            "{} stable at {} bytes after {:?}",
            path.display(),
            stable.size,
            stable.waited
        ),
        Err(e) => {
            warn!("Abandoning backup of {}: {}", path.display(), e);
            return;
        }
    }

    let worker = Arc::clone(&shared);
    let source = path.clone();
    let result = tokio::task::spawn_blocking(move || worker.fingerprint_and_copy(&source)).await;

    match result {
        Ok(Ok(record)) => {
            shared.journal.record(&Notice::FileCopied(record));
        }
        Ok(Err(e)) => warn!("{}", e),
        Err(e) => warn!("Backup worker for {} failed: {}", path.display(), e),
    }

    shared.completed.fetch_add(1, Ordering::AcqRel);
    drop(guard);
}
