//! Notification journal for copywatch
//!
//! This crate provides:
//! - Notice types and their one-line textual rendering
//! - The append-only, lock-guarded message log shared between the
//!   check cycle and background backup workers

pub mod journal;
pub mod notice;

// Re-exports
pub use journal::Journal;
pub use notice::{Notice, TIMESTAMP_FORMAT};
