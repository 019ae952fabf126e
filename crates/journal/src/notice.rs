//! Human-readable notices

use chrono::{DateTime, Local};
use copywatch_core::{BackupRecord, ChangeRecord, FileMeta};
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp layout used at the start of every message
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// An event worth a line in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A file appeared (detailed change report)
    NewFile { path: PathBuf, meta: FileMeta },
    /// A file's size, line count or mtime changed
    Modified {
        path: PathBuf,
        before: FileMeta,
        after: FileMeta,
    },
    /// A file disappeared (detailed change report)
    DeletedFile { path: PathBuf, meta: FileMeta },
    /// A new file was stabilized and backed up
    FileCopied(BackupRecord),
    /// A known file was removed
    FileDeleted { path: PathBuf },
    /// A new directory appeared
    DirectoryCopied { path: PathBuf },
    /// A known directory was removed
    DirectoryDeleted { path: PathBuf },
}

impl Notice {
    /// Tag printed after the timestamp
    pub fn tag(&self) -> &'static str {
        match self {
            Notice::NewFile { .. } => "NEW FILE",
            Notice::Modified { .. } => "MODIFIED",
            Notice::DeletedFile { .. } => "DELETED FILE",
            Notice::FileCopied(_) => "FILE COPIED",
            Notice::FileDeleted { .. } => "FILE DELETED",
            Notice::DirectoryCopied { .. } => "DIRECTORY COPIED",
            Notice::DirectoryDeleted { .. } => "DIRECTORY DELETED",
        }
    }

    /// Path the notice is about
    pub fn path(&self) -> &Path {
        match self {
            Notice::NewFile { path, .. }
            | Notice::Modified { path, .. }
            | Notice::DeletedFile { path, .. }
            | Notice::FileDeleted { path }
            | Notice::DirectoryCopied { path }
            | Notice::DirectoryDeleted { path } => path,
            Notice::FileCopied(record) => &record.source,
        }
    }

    /// Detailed-report notice for a change record
    ///
    /// Directory creations and deletions map to the directory notices;
    /// file creations and deletions keep their size and line counts.
    pub fn detailed(change: &ChangeRecord) -> Self {
        match change {
            ChangeRecord::NewFile { path, meta } => Notice::NewFile {
                path: path.clone(),
                meta: *meta,
            },
            ChangeRecord::NewDirectory { path } => Notice::DirectoryCopied { path: path.clone() },
            ChangeRecord::Modified {
                path,
                before,
                after,
            } => Notice::Modified {
                path: path.clone(),
                before: *before,
                after: *after,
            },
            ChangeRecord::DeletedFile { path, meta } => Notice::DeletedFile {
                path: path.clone(),
                meta: *meta,
            },
            ChangeRecord::DeletedDirectory { path } => Notice::DirectoryDeleted { path: path.clone() },
        }
    }

    /// Render the full log line with the given timestamp
    pub fn render(&self, at: &DateTime<Local>) -> String {
        format!("{} - {}: {}", at.format(TIMESTAMP_FORMAT), self.tag(), Details(self))
    }
}

/// Text after the tag
struct Details<'a>(&'a Notice);

impl fmt::Display for Details<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Notice::NewFile { path, meta } => write!(
                f,
                "{} ({} chars, {} lines)",
                path.display(),
                meta.size,
                meta.line_count
            ),
            Notice::Modified {
                path,
                before,
                after,
            } => write!(
                f,
                "{} (chars: {:+} [{}→{}], lines: {:+} [{}→{}])",
                path.display(),
                after.size as i64 - before.size as i64,
                before.size,
                after.size,
                after.line_count as i64 - before.line_count as i64,
                before.line_count,
                after.line_count
            ),
            Notice::DeletedFile { path, meta } => write!(
                f,
                "{} (was {} chars, {} lines)",
                path.display(),
                meta.size,
                meta.line_count
            ),
            Notice::FileCopied(record) => write!(
                f,
                "{} | Hash: {} | Backup: {}",
                record.source.display(),
                record.fingerprint,
                record.backup_path.display()
            ),
            Notice::FileDeleted { path }
            | Notice::DirectoryCopied { path }
            | Notice::DirectoryDeleted { path } => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use copywatch_core::Fingerprint;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_modified_rendering() {
        let notice = Notice::Modified {
            path: "/w/a.txt".into(),
            before: FileMeta::new(100, 10, 1),
            after: FileMeta::new(112, 11, 2),
        };

        assert_eq!(
            notice.render(&at()),
            "2024/03/09 14:05:07 - MODIFIED: /w/a.txt (chars: +12 [100→112], lines: +1 [10→11])"
        );
    }

    #[test]
    fn test_negative_and_zero_deltas() {
        let notice = Notice::Modified {
            path: "/w/a.txt".into(),
            before: FileMeta::new(8, 2, 1),
            after: FileMeta::new(5, 2, 2),
        };

        assert!(notice
            .render(&at())
            .ends_with("(chars: -3 [8→5], lines: +0 [2→2])"));
    }

    #[test]
    fn test_file_copied_rendering() {
        let notice = Notice::FileCopied(BackupRecord {
            source: "/w/a.txt".into(),
            fingerprint: Fingerprint::from_raw(29_388_150),
            backup_path: "/w/.copywatcher_backup/29388150_a.txt".into(),
        });

        assert_eq!(
            notice.render(&at()),
            "2024/03/09 14:05:07 - FILE COPIED: /w/a.txt | Hash: 29388150 | Backup: /w/.copywatcher_backup/29388150_a.txt"
        );
    }

    #[test]
    fn test_simple_notices() {
        let cases = [
            (Notice::FileDeleted { path: "/w/x".into() }, "FILE DELETED: /w/x"),
            (Notice::DirectoryCopied { path: "/w/d".into() }, "DIRECTORY COPIED: /w/d"),
            (Notice::DirectoryDeleted { path: "/w/d".into() }, "DIRECTORY DELETED: /w/d"),
            (
                Notice::NewFile {
                    path: "/w/n".into(),
                    meta: FileMeta::new(5, 1, 0),
                },
                "NEW FILE: /w/n (5 chars, 1 lines)",
            ),
            (
                Notice::DeletedFile {
                    path: "/w/n".into(),
                    meta: FileMeta::new(5, 1, 0),
                },
                "DELETED FILE: /w/n (was 5 chars, 1 lines)",
            ),
        ];

        for (notice, expected) in cases {
            let line = notice.render(&at());
            assert_eq!(line, format!("2024/03/09 14:05:07 - {}", expected));
        }
    }

    #[test]
    fn test_detailed_maps_kinds() {
        let change = ChangeRecord::DeletedDirectory { path: "/w/d".into() };
        assert_eq!(Notice::detailed(&change).tag(), "DIRECTORY DELETED");

        let change = ChangeRecord::NewFile {
            path: "/w/f".into(),
            meta: FileMeta::new(1, 1, 1),
        };
        let notice = Notice::detailed(&change);
        assert_eq!(notice.tag(), "NEW FILE");
        assert_eq!(notice.path(), Path::new("/w/f"));
    }
}
