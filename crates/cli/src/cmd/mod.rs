//! CLI command implementations

pub mod fingerprint;
pub mod monitor;
pub mod scan;
pub mod watch;
