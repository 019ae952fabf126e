//! Print the initial folder listing

use crate::util;
use anyhow::Result;
use copywatch_watcher::ChangeMonitor;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let root = util::existing_dir(root)?;

    for line in ChangeMonitor::new(root).initial_listing() {
        println!("{}", line);
    }
    Ok(())
}
