//! Watch a folder and back up new files

use crate::util;
use anyhow::{Context, Result};
use copywatch_journal::Journal;
use copywatch_watcher::{WatchConfig, WatchSession};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments of `copywatch watch`
pub struct WatchArgs {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub duration_secs: Option<u64>,
    pub report: Option<PathBuf>,
}

pub fn run(args: WatchArgs) -> Result<()> {
    // 1. Resolve configuration
    let mut config = WatchConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(interval_ms) = args.interval_ms {
        config.check_interval_ms = interval_ms;
    }
    config.validate().context("Invalid configuration")?;

    let root = util::existing_dir(&args.root)?;
    let stop = util::stop_flag()?;

    // 2. Start the session (records the existing tree as baseline)
    let mut session = WatchSession::with_config(&root, config.clone());
    // Outlives the session so messages can be read after shutdown
    let journal: Arc<Journal> = session.journal();
    eprintln!(
        "{} {} (backups in {})",
        "Watching".green().bold(),
        session.root().display(),
        session.backup_folder().display()
    );

    // 3. Check until interrupted or out of time
    let cycles = util::run_cycles(
        config.check_interval(),
        args.duration_secs.map(Duration::from_secs),
        &stop,
        || {
            session.check_for_changes();
        },
    );
    tracing::info!("Stopping after {} check(s)", cycles);

    // 4. Freeze detection and let in-flight backups finish
    session.set_finalizing(true);
    let report = session.shutdown();

    // 5. Emit the collected messages
    let messages = journal.messages();
    for message in &messages {
        println!("{}", message);
    }

    if let Some(path) = args.report {
        let mut text = messages.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    let summary = format!(
        "{} message(s), {} backup(s) completed, {} abandoned",
        messages.len(),
        report.completed,
        report.abandoned
    );
    if report.abandoned > 0 {
        eprintln!("{}", summary.yellow());
    } else {
        eprintln!("{}", summary.dimmed());
    }
    Ok(())
}
