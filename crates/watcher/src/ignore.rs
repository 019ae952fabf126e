//! Paths that are never watched
//!
//! Three sources, checked in order:
//! 1. The backup directory (always, so backups never trigger detection)
//! 2. Reserved file names such as the final report
//! 3. Optional gitignore-style patterns from configuration

use crate::config::WatchConfig;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Exclusion rule set for one watched root
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    /// Watched root directory
    root: PathBuf,

    /// Backup directory, pruned with everything below it
    backup_dir: Option<PathBuf>,

    /// File names excluded anywhere in the tree
    reserved_names: Vec<String>,

    /// Compiled config patterns (optional)
    patterns: Option<Gitignore>,
}

impl ExclusionRules {
    /// Rules that exclude nothing
    pub fn none(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            backup_dir: None,
            reserved_names: Vec::new(),
            patterns: None,
        }
    }

    /// Standard rules for a session: backup directory, reserved names and
    /// configured patterns
    ///
    /// Patterns that fail to compile are logged and skipped;
    /// [`WatchConfig::validate`] reports them up front.
    pub fn for_root(root: &Path, config: &WatchConfig) -> Self {
        let mut rules = Self::none(root).with_backup_dir(root.join(&config.backup_dir_name));
        for name in &config.reserved_names {
            rules = rules.with_reserved_name(name);
        }
        rules.with_patterns(&config.exclude_patterns)
    }

    /// Exclude a backup directory and its contents
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Exclude every entry with this file name
    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved_names.push(name.into());
        self
    }

    /// Add gitignore-style patterns, relative to the root
    pub fn with_patterns(mut self, patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return self;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("Skipping exclude pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) => self.patterns = Some(gitignore),
            Err(e) => tracing::warn!("Failed to compile exclude patterns: {}", e),
        }
        self
    }

    /// Check if an entry should be left out of snapshots
    ///
    /// Exclusion of a directory also prunes everything below it.
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        if let Some(ref backup_dir) = self.backup_dir {
            if path.starts_with(backup_dir) {
                return true;
            }
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.reserved_names.iter().any(|reserved| reserved == name) {
                return true;
            }
        }

        if let Some(ref patterns) = self.patterns {
            if path.starts_with(&self.root) && patterns.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ExclusionRules {
        ExclusionRules::for_root(Path::new("/w"), &WatchConfig::default())
    }

    #[test]
    fn test_backup_dir_always_excluded() {
        let rules = rules();
        assert!(rules.is_excluded(Path::new("/w/.copywatcher_backup"), true));
        assert!(rules.is_excluded(Path::new("/w/.copywatcher_backup/1_a.txt"), false));

        // Component-wise prefix, not string prefix
        assert!(!rules.is_excluded(Path::new("/w/.copywatcher_backup2/a.txt"), false));
    }

    #[test]
    fn test_reserved_name_anywhere() {
        let rules = rules();
        assert!(rules.is_excluded(Path::new("/w/resume.txt"), false));
        assert!(rules.is_excluded(Path::new("/w/sub/resume.txt"), false));
        assert!(!rules.is_excluded(Path::new("/w/resume.txt.bak"), false));
        assert!(!rules.is_excluded(Path::new("/w/src/main.rs"), false));
    }

    #[test]
    fn test_config_patterns() {
        let config = WatchConfig {
            exclude_patterns: vec!["*.swp".to_string(), "build/".to_string()],
            ..WatchConfig::default()
        };
        let rules = ExclusionRules::for_root(Path::new("/w"), &config);

        assert!(rules.is_excluded(Path::new("/w/notes.swp"), false));
        assert!(rules.is_excluded(Path::new("/w/build"), true));
        // Directory-only pattern does not match a file
        assert!(!rules.is_excluded(Path::new("/w/build"), false));
        assert!(!rules.is_excluded(Path::new("/w/src/main.rs"), false));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let config = WatchConfig {
            exclude_patterns: vec!["a[".to_string(), "*.log".to_string()],
            ..WatchConfig::default()
        };
        let rules = ExclusionRules::for_root(Path::new("/w"), &config);

        assert!(rules.is_excluded(Path::new("/w/x.log"), false));
        assert!(!rules.is_excluded(Path::new("/w/a["), false));
    }

    #[test]
    fn test_none_excludes_nothing() {
        let rules = ExclusionRules::none(Path::new("/w"));
        assert!(!rules.is_excluded(Path::new("/w/resume.txt"), false));
        assert!(!rules.is_excluded(Path::new("/w/.copywatcher_backup"), true));
    }
}
