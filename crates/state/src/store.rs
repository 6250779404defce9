//! Locating and parsing the on-disk state artifacts.
//!
//! The maintenance jobs own these files; the store only reads them. No read
//! here returns an error to the caller. Snapshots come back as an
//! [`ArtifactRead`], event logs as an [`EventLog`] whose malformed lines have
//! been counted and dropped, and backup listings as a possibly-empty list.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::error::StateError;

pub const SYSTEM_SNAPSHOT: &str = "system_info.json";
pub const MONITORING_SNAPSHOT: &str = "monitoring_summary.json";
pub const SECURITY_SNAPSHOT: &str = "security_summary.json";
pub const BACKUP_INFO_SNAPSHOT: &str = "last_backup_info.json";
pub const MONITORING_LOG: &str = "monitoring_data.json";
pub const SECURITY_LOG: &str = "security_data.json";

/// Reserved backup directory name: an alias for the newest backup, never
/// listed on its own.
pub const LATEST_ALIAS: &str = "latest";

/// Where the state artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    /// Directory holding the snapshot and event-log files.
    pub data_dir: PathBuf,
    /// Directory whose subdirectories are individual backups.
    pub backup_dir: PathBuf,
}

impl StatePaths {
    /// Standard layout: backups live in `<data_dir>/backups`.
    pub fn under(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let backup_dir = data_dir.join("backups");
        Self {
            data_dir,
            backup_dir,
        }
    }
}

/// Outcome of reading one snapshot artifact.
#[derive(Debug)]
pub enum ArtifactRead<T> {
    /// The file exists and parsed into `T`.
    Present(T),
    /// No such file.
    Absent,
    /// The file exists but could not be read or parsed.
    Unreadable(StateError),
}

impl<T> ArtifactRead<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, ArtifactRead::Present(_))
    }

    /// The parsed value, if any. An unreadable artifact is logged and
    /// treated as absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            ArtifactRead::Present(value) => Some(value),
            ArtifactRead::Absent => None,
            ArtifactRead::Unreadable(error) => {
                tracing::warn!(%error, "ignoring unreadable state artifact");
                None
            }
        }
    }

    pub fn or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

/// Parsed contents of a newline-delimited JSON event log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    /// Records in file order (oldest first).
    pub records: Vec<Map<String, Value>>,
    /// Number of non-blank lines that were not a JSON object.
    pub skipped: usize,
}

/// A backup directory found under the backup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    /// Sum of the sizes of the regular files below `path`.
    pub size_bytes: u64,
}

/// Read-only access to the state artifacts under a [`StatePaths`] layout.
#[derive(Debug, Clone)]
pub struct StateStore {
    paths: StatePaths,
}

impl StateStore {
    pub fn new(paths: StatePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    /// Read and parse one snapshot file from the data directory.
    pub fn read_snapshot<T: DeserializeOwned>(&self, file_name: &str) -> ArtifactRead<T> {
        let path = self.paths.data_dir.join(file_name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "snapshot absent");
                return ArtifactRead::Absent;
            }
            Err(source) => return ArtifactRead::Unreadable(StateError::Io { path, source }),
        };

        match serde_json::from_str(&text) {
            Ok(value) => ArtifactRead::Present(value),
            Err(source) => ArtifactRead::Unreadable(StateError::Json { path, source }),
        }
    }

    /// Read an event log from the data directory, one JSON object per line.
    ///
    /// Lines are parsed independently: a malformed line is counted in
    /// [`EventLog::skipped`] and reading carries on. A missing or unreadable
    /// file is an empty log.
    pub fn read_event_log(&self, file_name: &str) -> EventLog {
        let path = self.paths.data_dir.join(file_name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "could not open event log");
                }
                return EventLog::default();
            }
        };

        let log = parse_event_lines(BufReader::new(file));
        if log.skipped > 0 {
            tracing::debug!(
                path = %path.display(),
                skipped = log.skipped,
                "skipped malformed event-log lines"
            );
        }
        log
    }

    /// Backup directories, newest first.
    ///
    /// Only immediate subdirectories of the backup root are listed, and the
    /// `latest` alias is left out. Names are fixed-width timestamps, so the
    /// descending lexical order is also descending chronological order.
    pub fn list_backups(&self) -> Vec<BackupEntry> {
        let entries = match fs::read_dir(&self.paths.backup_dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.paths.backup_dir.display(),
                        error = %e,
                        "could not list backups"
                    );
                }
                return Vec::new();
            }
        };

        let mut backups: Vec<BackupEntry> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name == LATEST_ALIAS {
                    return None;
                }
                let path = entry.path();
                let size_bytes = directory_size(&path);
                Some(BackupEntry {
                    name,
                    path,
                    size_bytes,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.name.cmp(&a.name));
        backups
    }
}

/// Parse newline-delimited JSON objects from a reader.
///
/// Bytes that are not valid UTF-8 only spoil their own line. Reading stops
/// at the first I/O error, keeping what was parsed so far.
pub(crate) fn parse_event_lines(mut reader: impl BufRead) -> EventLog {
    let mut log = EventLog::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "event log read interrupted");
                break;
            }
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_slice::<Value>(trimmed) {
            Ok(Value::Object(record)) => log.records.push(record),
            _ => log.skipped += 1,
        }
    }

    log
}

/// Recursive sum of regular-file sizes below `path`.
///
/// Symlinks are not followed. Entries that disappear or cannot be stat'ed
/// while walking are skipped.
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MonitoringSummary;

    fn store_in(dir: &Path) -> StateStore {
        StateStore::new(StatePaths::under(dir))
    }

    #[test]
    fn snapshot_absent() {
        let dir = tempfile::tempdir().unwrap();
        let read: ArtifactRead<MonitoringSummary> =
            store_in(dir.path()).read_snapshot(MONITORING_SNAPSHOT);
        assert!(matches!(read, ArtifactRead::Absent));
    }

    #[test]
    fn snapshot_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MONITORING_SNAPSHOT),
            r#"{"timestamp": "2024-05-01 12:00:00", "alerts": 2}"#,
        )
        .unwrap();

        let summary: MonitoringSummary = store_in(dir.path())
            .read_snapshot(MONITORING_SNAPSHOT)
            .or_default();
        assert_eq!(summary.timestamp, "2024-05-01 12:00:00");
        assert_eq!(summary.alerts, 2);
    }

    #[test]
    fn snapshot_with_mistyped_field_is_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MONITORING_SNAPSHOT),
            r#"{"timestamp": "2024-05-01 12:00:00", "alerts": null}"#,
        )
        .unwrap();

        let read: ArtifactRead<MonitoringSummary> =
            store_in(dir.path()).read_snapshot(MONITORING_SNAPSHOT);
        match read {
            ArtifactRead::Present(summary) => {
                assert_eq!(summary.timestamp, "2024-05-01 12:00:00");
                assert_eq!(summary.alerts, 0);
            }
            other => panic!("expected present snapshot, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_corrupt_is_unreadable_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MONITORING_SNAPSHOT), "{not json").unwrap();

        let store = store_in(dir.path());
        let read: ArtifactRead<MonitoringSummary> = store.read_snapshot(MONITORING_SNAPSHOT);
        match read {
            ArtifactRead::Unreadable(StateError::Json { path, .. }) => {
                assert!(path.ends_with(MONITORING_SNAPSHOT));
            }
            other => panic!("expected unreadable JSON, got {other:?}"),
        }

        let summary: MonitoringSummary = store.read_snapshot(MONITORING_SNAPSHOT).or_default();
        assert_eq!(summary, MonitoringSummary::default());
    }

    #[test]
    fn snapshot_wrong_shape_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MONITORING_SNAPSHOT), "[1, 2, 3]").unwrap();

        let read: ArtifactRead<MonitoringSummary> =
            store_in(dir.path()).read_snapshot(MONITORING_SNAPSHOT);
        assert!(matches!(read, ArtifactRead::Unreadable(_)));
    }

    #[test]
    fn event_log_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = store_in(dir.path()).read_event_log(MONITORING_LOG);
        assert!(log.records.is_empty());
        assert_eq!(log.skipped, 0);
    }

    #[test]
    fn event_log_skips_malformed_lines_only() {
        let dir = tempfile::tempdir().unwrap();
        let lines = [
            r#"{"type": "cpu", "value": 10}"#,
            r#"{"type": "cpu", "value": "#,
            r#"{"type": "memory", "value": 40}"#,
            "",
            r#"{"type": "disk", "value": 70}"#,
        ];
        fs::write(dir.path().join(MONITORING_LOG), lines.join("\n")).unwrap();

        let log = store_in(dir.path()).read_event_log(MONITORING_LOG);
        assert_eq!(log.records.len(), 3);
        assert_eq!(log.skipped, 1);
        assert_eq!(log.records[2]["type"], "disk");
    }

    #[test]
    fn event_log_non_objects_and_bad_utf8_are_skipped() {
        let mut bytes = b"42\n\"text\"\n".to_vec();
        bytes.extend_from_slice(b"{\"message\": \"\xff\xfe\"}\n");
        bytes.extend_from_slice(b"{\"severity\": \"HIGH\"}\r\n");

        let log = parse_event_lines(&bytes[..]);
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.skipped, 3);
        assert_eq!(log.records[0]["severity"], "HIGH");
    }

    #[test]
    fn event_log_without_trailing_newline() {
        let log = parse_event_lines(&b"{\"a\": 1}\n{\"a\": 2}"[..]);
        assert_eq!(log.records.len(), 2);
    }

    #[test]
    fn backups_sorted_descending_without_latest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        for name in ["20230101_000000", "20230615_143000", "20221231_235959", "latest"] {
            fs::create_dir_all(root.join(name)).unwrap();
        }
        fs::write(root.join("notes.txt"), "not a backup").unwrap();

        let names: Vec<String> = store_in(dir.path())
            .list_backups()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(
            names,
            vec!["20230615_143000", "20230101_000000", "20221231_235959"]
        );
    }

    #[test]
    fn backups_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(dir.path()).list_backups().is_empty());
    }

    #[test]
    fn backup_entry_carries_recursive_size() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backups").join("20230615_143000");
        fs::create_dir_all(backup.join("etc/ssh")).unwrap();
        fs::write(backup.join("a.tar"), vec![0u8; 1000]).unwrap();
        fs::write(backup.join("etc/hosts"), vec![0u8; 24]).unwrap();
        fs::write(backup.join("etc/ssh/sshd_config"), vec![0u8; 512]).unwrap();

        let backups = store_in(dir.path()).list_backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].size_bytes, 1536);
    }

    #[cfg(unix)]
    #[test]
    fn directory_size_ignores_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("huge.img"), vec![0u8; 1 << 20]).unwrap();

        let backup = dir.path().join("backups").join("20230615_143000");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join("a.tar"), vec![0u8; 100]).unwrap();
        symlink(outside.join("huge.img"), backup.join("huge.img")).unwrap();
        symlink(&outside, backup.join("outside")).unwrap();
        symlink(dir.path().join("vanished"), backup.join("dangling")).unwrap();

        assert_eq!(directory_size(&backup), 100);
        let backups = store_in(dir.path()).list_backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].size_bytes, 100);
    }

    #[test]
    fn directory_size_of_missing_path_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(directory_size(&dir.path().join("gone")), 0);
    }
}
