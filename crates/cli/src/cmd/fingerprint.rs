//! Print content fingerprints

use anyhow::Result;
use copywatch_core::fingerprint_file;
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub fn run(files: &[PathBuf]) -> Result<()> {
    let mut unreadable = 0;

    for path in files {
        let probe = fingerprint_file(path);
        if let Some(reason) = probe.reason() {
            eprintln!("{} {}", "warning:".yellow().bold(), reason);
            unreadable += 1;
        }
        println!("{}  {}", probe.value(), path.display());
    }

    if unreadable > 0 {
        anyhow::bail!("{} file(s) could not be read; seed value printed", unreadable);
    }
    Ok(())
}
