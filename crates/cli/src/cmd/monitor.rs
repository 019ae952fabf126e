//! Print detailed change notices

use crate::util;
use anyhow::Result;
use copywatch_watcher::ChangeMonitor;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

pub fn run(root: &Path, interval_ms: u64, duration_secs: Option<u64>) -> Result<()> {
    if interval_ms == 0 {
        anyhow::bail!("--interval-ms must be greater than zero");
    }
    let root = util::existing_dir(root)?;
    let stop = util::stop_flag()?;

    let mut monitor = ChangeMonitor::new(root);
    for line in monitor.initial_listing() {
        println!("{}", line);
    }
    eprintln!("{} {}", "Monitoring".green().bold(), monitor.root().display());

    util::run_cycles(
        Duration::from_millis(interval_ms),
        duration_secs.map(Duration::from_secs),
        &stop,
        || {
            for line in monitor.check_detailed() {
                println!("{}", line);
            }
        },
    );
    Ok(())
}
