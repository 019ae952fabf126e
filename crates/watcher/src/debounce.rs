//! New-file stabilization
//!
//! A freshly detected file may still be written to. Before it is hashed and
//! copied, its size is sampled at a fixed cadence until enough consecutive
//! samples agree.

use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Stabilizer tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeConfig {
    /// Delay between size samples
    pub interval: Duration,
    /// Consecutive identical samples needed to declare the file stable
    pub required_samples: u32,
    /// Give up after this long; `None` waits as long as writes continue
    pub timeout: Option<Duration>,
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            required_samples: 3,
            timeout: None,
        }
    }
}

/// Why a wait ended without a stable file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StabilizeError {
    /// The owning task was told to stop
    #[error("stabilization cancelled")]
    Cancelled,

    /// The configured timeout elapsed first
    #[error("file still changing after {0:?}")]
    TimedOut(Duration),
}

/// A file that stopped changing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stabilized {
    /// Size agreed on by the final samples
    pub size: u64,
    /// Samples taken in total
    pub samples: u32,
    /// Time spent waiting
    pub waited: Duration,
}

/// Waits for files to stop growing
#[derive(Debug, Clone, Copy, Default)]
pub struct Stabilizer {
    config: StabilizeConfig,
}

impl Stabilizer {
    /// Create a stabilizer
    pub fn new(config: StabilizeConfig) -> Self {
        Self { config }
    }

    /// Settings in effect
    pub fn config(&self) -> &StabilizeConfig {
        &self.config
    }

    /// Wait until `path` reports the same size `required_samples` times in a row
    ///
    /// A failed size probe (file missing or locked) resets the streak and
    /// the wait continues. Cancellation is observed between samples.
    pub async fn wait(&self, path: &Path, cancel: &CancellationToken) -> Result<Stabilized, StabilizeError> {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| started + t);
        let required = self.config.required_samples.max(1);

        let mut previous: Option<u64> = None;
        let mut streak = 0u32;
        let mut samples = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(StabilizeError::Cancelled);
            }

            samples += 1;
            match tokio::fs::metadata(path).await {
                Ok(metadata) => {
                    let size = metadata.len();
                    if previous == Some(size) {
                        streak += 1;
                    } else {
                        streak = 1;
                        previous = Some(size);
                    }
                }
                Err(e) => {
                    tracing::debug!("Size probe failed for {}: {}", path.display(), e);
                    streak = 0;
                    previous = None;
                }
            }

            if streak >= required {
                if let Some(size) = previous {
                    return Ok(Stabilized {
                        size,
                        samples,
                        waited: started.elapsed(),
                    });
                }
            }

            if let Some(deadline) = deadline {
                if Instant::now() + self.config.interval > deadline {
                    return Err(StabilizeError::TimedOut(started.elapsed()));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(StabilizeError::Cancelled),
                _ = sleep(self.config.interval) => {}
            }
        }
    }
}
