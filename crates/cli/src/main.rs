//! Copywatch CLI - copywatch command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod logging;
mod util;

/// Copywatch - back up every new file that appears in a folder
#[derive(Parser)]
#[command(name = "copywatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a folder and back up new files until interrupted
    Watch {
        /// Folder to watch
        root: PathBuf,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Delay between checks in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(long)]
        duration_secs: Option<u64>,
        /// Write the collected messages to this file on exit
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print detailed change notices (sizes and line counts) for a folder
    Monitor {
        /// Folder to monitor
        root: PathBuf,
        /// Delay between checks in milliseconds (default: 2000)
        #[arg(long, default_value = "2000")]
        interval_ms: u64,
        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// List every file in a folder with its size and line count
    Scan {
        /// Folder to scan
        root: PathBuf,
    },
    /// Print the content fingerprint of files
    Fingerprint {
        /// Files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flushes the file sink on exit
    let _log_guard = logging::init(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Watch {
            root,
            config,
            interval_ms,
            duration_secs,
            report,
        } => cmd::watch::run(cmd::watch::WatchArgs {
            root,
            config,
            interval_ms,
            duration_secs,
            report,
        }),
        Commands::Monitor {
            root,
            interval_ms,
            duration_secs,
        } => cmd::monitor::run(&root, interval_ms, duration_secs),
        Commands::Scan { root } => cmd::scan::run(&root),
        Commands::Fingerprint { files } => cmd::fingerprint::run(&files),
    }
}
