//! Watch configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) gives the baseline behavior.

use crate::debounce::StabilizeConfig;
use copywatch_core::DEFAULT_BACKUP_DIR;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Report file name that is never watched
pub const DEFAULT_REPORT_NAME: &str = "resume.txt";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An exclude pattern does not compile
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Stabilizer settings as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizeSettings {
    /// Delay between size samples
    pub interval_ms: u64,
    /// Consecutive identical samples needed
    pub required_samples: u32,
    /// Give up after this long (0 = wait forever)
    pub timeout_secs: u64,
}

impl Default for StabilizeSettings {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            required_samples: 3,
            timeout_secs: 0,
        }
    }
}

impl StabilizeSettings {
    /// Runtime form of these settings
    pub fn to_config(&self) -> StabilizeConfig {
        StabilizeConfig {
            interval: Duration::from_millis(self.interval_ms),
            required_samples: self.required_samples,
            timeout: match self.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Backup directory name, created under the watched root
    pub backup_dir_name: String,
    /// File names excluded anywhere in the tree
    pub reserved_names: Vec<String>,
    /// Extra gitignore-style exclude patterns
    pub exclude_patterns: Vec<String>,
    /// Track directories as well as files
    pub include_directories: bool,
    /// Delay between checks when driven by the CLI
    pub check_interval_ms: u64,
    /// How long shutdown waits for in-flight backups
    pub shutdown_grace_secs: u64,
    /// Threads of the backup worker runtime
    pub worker_threads: usize,
    /// New-file stabilization
    pub stabilize: StabilizeSettings,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            backup_dir_name: DEFAULT_BACKUP_DIR.to_string(),
            reserved_names: vec![DEFAULT_REPORT_NAME.to_string()],
            exclude_patterns: Vec::new(),
            include_directories: true,
            check_interval_ms: 2000,
            shutdown_grace_secs: 5,
            worker_threads: 2,
            stabilize: StabilizeSettings::default(),
        }
    }
}

impl WatchConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: WatchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges and patterns
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut components = Path::new(&self.backup_dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "backup_dir_name must be a single directory name, got '{}'",
                    self.backup_dir_name
                )))
            }
        }

        check_range("stabilize.interval_ms", self.stabilize.interval_ms, 10, 60_000)?;
        check_range(
            "stabilize.required_samples",
            u64::from(self.stabilize.required_samples),
            2,
            20,
        )?;
        check_range("worker_threads", self.worker_threads as u64, 1, 64)?;
        check_range("shutdown_grace_secs", self.shutdown_grace_secs, 0, 300)?;
        check_range("check_interval_ms", self.check_interval_ms, 100, 3_600_000)?;

        for pattern in &self.exclude_patterns {
            let mut builder = ignore::gitignore::GitignoreBuilder::new("");
            builder
                .add_line(None, pattern)
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Grace period granted to in-flight backups at shutdown
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Delay between checks
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

fn check_range(key: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{} = {} is outside {}..={}",
            key, value, min, max
        )));
    }
    Ok(())
}
