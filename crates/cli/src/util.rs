//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of the stop-flag check while sleeping between cycles
const STOP_POLL: Duration = Duration::from_millis(50);

/// Flag raised by SIGINT or SIGTERM
pub fn stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    // Handlers only set the flag; the loop notices it between cycles
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, Arc::clone(&stop))
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }
    Ok(stop)
}

/// Resolve and check a folder argument
pub fn existing_dir(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }
    Ok(root.to_path_buf())
}

/// Run `cycle` every `interval` until `stop` is raised or `limit` elapses
///
/// Returns the number of cycles run.
pub fn run_cycles(
    interval: Duration,
    limit: Option<Duration>,
    stop: &AtomicBool,
    mut cycle: impl FnMut(),
) -> u64 {
    let started = Instant::now();
    let expired = || limit.is_some_and(|limit| started.elapsed() >= limit);
    let mut cycles = 0;

    while !stop.load(Ordering::Relaxed) && !expired() {
        cycle();
        cycles += 1;

        let next = Instant::now() + interval;
        while Instant::now() < next {
            if stop.load(Ordering::Relaxed) || expired() {
                return cycles;
            }
            std::thread::sleep(STOP_POLL.min(next.saturating_duration_since(Instant::now())));
        }
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_cycles_respects_limit() {
        let stop = AtomicBool::new(false);
        let mut count = 0;
        let cycles = run_cycles(
            Duration::from_millis(100),
            Some(Duration::from_millis(250)),
            &stop,
            || count += 1,
        );
        assert_eq!(cycles, count);
        assert!((2..=4).contains(&cycles), "ran {} cycles", cycles);
    }

    #[test]
    fn test_run_cycles_stops_on_flag() {
        let stop = AtomicBool::new(false);
        let cycles = run_cycles(Duration::from_secs(60), None, &stop, || {
            stop.store(true, Ordering::Relaxed)
        });
        assert_eq!(cycles, 1);
    }

    #[test]
    fn test_existing_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(existing_dir(temp_dir.path()).is_ok());
        assert!(existing_dir(&temp_dir.path().join("missing")).is_err());
    }
}
