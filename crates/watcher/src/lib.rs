//! Polling folder watcher for Copywatch
//!
//! This crate provides:
//! - Full-tree snapshots with exclusion rules
//! - New-file stabilization before backup
//! - A background backup pipeline with bounded shutdown
//! - The watch session and the detailed change monitor built on them

pub mod config;
pub mod debounce;
pub mod ignore;
pub mod monitor;
pub mod pipeline;
pub mod session;
pub mod snapshot;

pub use config::{ConfigError, StabilizeSettings, WatchConfig, DEFAULT_REPORT_NAME};
pub use debounce::{StabilizeConfig, StabilizeError, Stabilized, Stabilizer};
pub use ignore::ExclusionRules;
pub use monitor::ChangeMonitor;
pub use pipeline::{BackupPipeline, ShutdownReport};
pub use session::{CycleOutcome, WatchSession};
pub use snapshot::{Snapshotter, WalkOptions};
