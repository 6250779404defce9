//! Per-domain views: snapshot and event-log data merged into the shape both
//! the page renderer and the JSON API consume.
//!
//! The `build_*` functions are pure. The `StateStore::*_view` methods read
//! the artifacts for a domain and hand them to the matching builder; they
//! cannot fail.

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::domain::Domain;
use crate::format::{backup_date, format_size, format_timestamp, format_uptime};
use crate::host::HostFacts;
use crate::record::{
    BackupInfo, MetricSample, MonitoringSummary, SecurityIssue, SecuritySummary, Series,
    SystemSnapshot,
};
use crate::store::{
    ArtifactRead, BackupEntry, EventLog, StateStore, BACKUP_INFO_SNAPSHOT, MONITORING_LOG,
    MONITORING_SNAPSHOT, SECURITY_LOG, SECURITY_SNAPSHOT, SYSTEM_SNAPSHOT,
};

const UNKNOWN: &str = "Unknown";

/// Keys the system view sets itself. A snapshot's extra keys with these
/// names are dropped so each appears once in the JSON body.
const SYSTEM_VIEW_KEYS: [&str; 8] = [
    "hostname",
    "kernel",
    "os",
    "uptime",
    "collected_at",
    "cpu_info",
    "memory_info",
    "source",
];

/// Where the system view's facts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewSource {
    Snapshot,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemView {
    pub hostname: String,
    pub kernel: String,
    pub os: String,
    pub uptime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    pub cpu_info: String,
    pub memory_info: String,
    pub source: ViewSource,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Latest value of each monitoring series; `None` when the log holds no
/// record of that series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentValues {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub disk: Option<f64>,
    pub load: Option<f64>,
    pub zombies: Option<f64>,
}

impl CurrentValues {
    pub fn get(&self, series: Series) -> Option<f64> {
        match series {
            Series::Cpu => self.cpu,
            Series::Memory => self.memory,
            Series::Disk => self.disk,
            Series::Load => self.load,
            Series::Zombies => self.zombies,
        }
    }

    fn slot(&mut self, series: Series) -> &mut Option<f64> {
        match series {
            Series::Cpu => &mut self.cpu,
            Series::Memory => &mut self.memory,
            Series::Disk => &mut self.disk,
            Series::Load => &mut self.load,
            Series::Zombies => &mut self.zombies,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitoringView {
    pub summary: MonitoringSummary,
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
    pub disk: Vec<MetricSample>,
    pub load: Vec<MetricSample>,
    pub zombies: Vec<MetricSample>,
    pub current: CurrentValues,
}

impl MonitoringView {
    /// All samples of one series, oldest first.
    pub fn series(&self, series: Series) -> &[MetricSample] {
        match series {
            Series::Cpu => &self.cpu,
            Series::Memory => &self.memory,
            Series::Disk => &self.disk,
            Series::Load => &self.load,
            Series::Zombies => &self.zombies,
        }
    }

    fn series_mut(&mut self, series: Series) -> &mut Vec<MetricSample> {
        match series {
            Series::Cpu => &mut self.cpu,
            Series::Memory => &mut self.memory,
            Series::Disk => &mut self.disk,
            Series::Load => &mut self.load,
            Series::Zombies => &mut self.zombies,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityView {
    pub summary: SecuritySummary,
    /// Issues in log order, oldest first.
    pub issues: Vec<SecurityIssue>,
}

/// One row of the backup listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupListing {
    /// Directory name.
    pub id: String,
    /// Parsed timestamp, or the raw name when it is not a timestamp.
    pub date: String,
    pub size: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackupView {
    pub last_backup: BackupInfo,
    /// Newest first.
    pub backups: Vec<BackupListing>,
}

/// Any one of the four views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainView {
    System(SystemView),
    Monitoring(MonitoringView),
    Security(SecurityView),
    Backup(BackupView),
}

/// Merge the system snapshot with live facts.
///
/// A present snapshot supplies hostname, kernel, OS and uptime outright,
/// regardless of age; keys it lacks are `"Unknown"`. Without a snapshot the
/// live facts are used. CPU and memory always come from the live host, even
/// when the snapshot carries its own `cpu_info` or `memory_info`.
pub fn build_system_view(
    snapshot: Option<SystemSnapshot>,
    facts: &HostFacts,
    now: OffsetDateTime,
) -> SystemView {
    let cpu_info = facts.cpu_info.clone().unwrap_or_else(|| UNKNOWN.to_string());
    let memory_info = facts
        .memory_info
        .clone()
        .unwrap_or_else(|| UNKNOWN.to_string());
    let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

    match snapshot {
        Some(mut snapshot) => {
            snapshot
                .extra
                .retain(|key, _| !SYSTEM_VIEW_KEYS.contains(&key.as_str()));
            SystemView {
                hostname: or_unknown(snapshot.hostname),
                kernel: or_unknown(snapshot.kernel),
                os: or_unknown(snapshot.os),
                uptime: or_unknown(snapshot.uptime),
                collected_at: snapshot.collected_at,
                cpu_info,
                memory_info,
                source: ViewSource::Snapshot,
                extra: snapshot.extra,
            }
        }
        None => SystemView {
            hostname: or_unknown(facts.hostname.clone()),
            kernel: or_unknown(facts.kernel.clone()),
            os: or_unknown(facts.os_name.clone()),
            uptime: or_unknown(facts.uptime_secs.map(format_uptime)),
            collected_at: Some(format_timestamp(now)),
            cpu_info,
            memory_info,
            source: ViewSource::Live,
            extra: Map::new(),
        },
    }
}

/// Group the monitoring log by series and pick each series' latest value.
///
/// Log order is insertion order, so the last record of a series is its
/// current value. A record without a numeric `value` counts as 0. Records of
/// unknown series are dropped.
pub fn build_monitoring_view(summary: MonitoringSummary, log: EventLog) -> MonitoringView {
    let mut view = MonitoringView {
        summary,
        ..MonitoringView::default()
    };

    for sample in log.records.into_iter().filter_map(MetricSample::from_record) {
        *view.current.slot(sample.series) = Some(sample.numeric_value().unwrap_or(0.0));
        view.series_mut(sample.series).push(sample);
    }

    view
}

pub fn build_security_view(summary: SecuritySummary, log: EventLog) -> SecurityView {
    SecurityView {
        summary,
        issues: log
            .records
            .into_iter()
            .map(SecurityIssue::from_record)
            .collect(),
    }
}

/// Attach display dates and sizes to the backup directory listing.
pub fn build_backup_view(last_backup: BackupInfo, entries: Vec<BackupEntry>) -> BackupView {
    let backups = entries
        .into_iter()
        .map(|entry| BackupListing {
            date: backup_date(&entry.name),
            size: format_size(entry.size_bytes),
            size_bytes: entry.size_bytes,
            id: entry.name,
        })
        .collect();

    BackupView {
        last_backup,
        backups,
    }
}

impl StateStore {
    pub fn system_view(&self, facts: &HostFacts, now: OffsetDateTime) -> SystemView {
        let snapshot: ArtifactRead<SystemSnapshot> = self.read_snapshot(SYSTEM_SNAPSHOT);
        build_system_view(snapshot.into_option(), facts, now)
    }

    pub fn monitoring_view(&self) -> MonitoringView {
        build_monitoring_view(
            self.read_snapshot(MONITORING_SNAPSHOT).or_default(),
            self.read_event_log(MONITORING_LOG),
        )
    }

    pub fn security_view(&self) -> SecurityView {
        build_security_view(
            self.read_snapshot(SECURITY_SNAPSHOT).or_default(),
            self.read_event_log(SECURITY_LOG),
        )
    }

    pub fn backup_view(&self) -> BackupView {
        build_backup_view(
            self.read_snapshot(BACKUP_INFO_SNAPSHOT).or_default(),
            self.list_backups(),
        )
    }

    /// Build the view for `domain`, collecting live host facts when the
    /// domain needs them.
    pub fn view(&self, domain: Domain) -> DomainView {
        match domain {
            Domain::System => DomainView::System(
                self.system_view(&HostFacts::collect(), crate::format::now()),
            ),
            Domain::Monitoring => DomainView::Monitoring(self.monitoring_view()),
            Domain::Security => DomainView::Security(self.security_view()),
            Domain::Backup => DomainView::Backup(self.backup_view()),
        }
    }
}
