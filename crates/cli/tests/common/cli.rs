//! CLI command execution helpers with timing
//!
//! Wraps the built `copywatch` binary, captures its output and measures how
//! long it ran.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// CLI command builder with timing
pub struct CopywatchCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl CopywatchCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_copywatch")),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add command arguments
    pub fn args<S: AsRef<str>>(&mut self, args: &[S]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env_remove("COPYWATCH_LOG")
            .envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Start the command without waiting for it
    pub fn spawn(&self) -> Result<RunningCommand> {
        let child = self.command().spawn().context("Failed to spawn command")?;
        Ok(RunningCommand {
            child,
            started: Instant::now(),
        })
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        self.spawn()?.wait()
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// A command started with [`CopywatchCommand::spawn`]
pub struct RunningCommand {
    child: Child,
    started: Instant,
}

impl RunningCommand {
    /// Wait for exit and collect output
    pub fn wait(self) -> Result<CommandResult> {
        let output = self
            .child
            .wait_with_output()
            .context("Failed to wait for command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: self.started.elapsed(),
        })
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Stdout lines containing `tag` (e.g. `FILE COPIED:`)
    pub fn lines_tagged(&self, tag: &str) -> Vec<&str> {
        self.stdout.lines().filter(|line| line.contains(tag)).collect()
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// copywatch!(dir, "scan", ".").assert_success()?;
/// ```
#[macro_export]
macro_rules! copywatch {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::CopywatchCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
