//! Typed records for the snapshots and event-log lines written by the
//! maintenance jobs.
//!
//! Snapshots are parsed with serde and carry their documented defaults, so a
//! missing key never needs a lookup-with-default at render time. Keys the
//! jobs add beyond the documented ones are kept in `extra` and passed through
//! to the JSON API untouched. A documented key holding a value of the wrong
//! type falls back to that key's default; the rest of the snapshot is kept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

const NEVER: &str = "Never";

/// `system_info.json`, written by the system facts job.
///
/// Every field is optional: a present snapshot wins over live facts, but a
/// key it lacks still renders as `"Unknown"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSnapshot {
    #[serde(deserialize_with = "optional_text")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub kernel: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub os: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub uptime: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub collected_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `monitoring_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSummary {
    /// Time of the last monitor run.
    #[serde(deserialize_with = "timestamp_or_never")]
    pub timestamp: String,
    /// Number of alerts raised by the last run.
    #[serde(deserialize_with = "count_or_zero")]
    pub alerts: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MonitoringSummary {
    fn default() -> Self {
        Self {
            timestamp: NEVER.to_string(),
            alerts: 0,
            extra: Map::new(),
        }
    }
}

/// `security_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySummary {
    /// Time of the last scan.
    #[serde(deserialize_with = "timestamp_or_never")]
    pub timestamp: String,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_issues: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub high_issues: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub medium_issues: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub low_issues: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SecuritySummary {
    fn default() -> Self {
        Self {
            timestamp: NEVER.to_string(),
            total_issues: 0,
            high_issues: 0,
            medium_issues: 0,
            low_issues: 0,
            extra: Map::new(),
        }
    }
}

/// `last_backup_info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupInfo {
    #[serde(deserialize_with = "timestamp_or_never")]
    pub timestamp: String,
    #[serde(deserialize_with = "location_or_unknown")]
    pub location: String,
    /// Directories included in the last backup. Older jobs write a single
    /// string, newer ones a list; both are normalized to one string.
    #[serde(deserialize_with = "string_or_list")]
    pub directories: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BackupInfo {
    fn default() -> Self {
        Self {
            timestamp: NEVER.to_string(),
            location: "Unknown".to_string(),
            directories: "None".to_string(),
            extra: Map::new(),
        }
    }
}

/// Scalar JSON value as display text. Objects, arrays and `null` have none.
fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(Value::deserialize(deserializer)?))
}

fn timestamp_or_never<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(Value::deserialize(deserializer)?).unwrap_or_else(|| NEVER.to_string()))
}

fn location_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(Value::deserialize(deserializer)?).unwrap_or_else(|| "Unknown".to_string()))
}

/// Non-negative integer, or a string holding one. Anything else is 0.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(list) => list
            .into_iter()
            .filter_map(text)
            .collect::<Vec<_>>()
            .join(", "),
        other => text(other).unwrap_or_else(|| "None".to_string()),
    })
}

/// A monitoring event series. Lines in `monitoring_data.json` are tagged
/// with one of these in their `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Cpu,
    Memory,
    Disk,
    Load,
    Zombies,
}

impl Series {
    pub const ALL: [Series; 5] = [
        Series::Cpu,
        Series::Memory,
        Series::Disk,
        Series::Load,
        Series::Zombies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Series::Cpu => "cpu",
            Series::Memory => "memory",
            Series::Disk => "disk",
            Series::Load => "load",
            Series::Zombies => "zombies",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Series {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Series::ALL
            .into_iter()
            .find(|series| series.as_str() == s)
            .ok_or(())
    }
}

/// One line of the monitoring event log.
///
/// Only `type`, `timestamp` and `value` are interpreted; series-specific
/// keys (`load1`, `mountpoint`, `filesystem`, ...) ride along in `detail`.
/// `value` keeps the number exactly as written, so `10` is served as `10`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    #[serde(rename = "type")]
    pub series: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,
    #[serde(flatten)]
    pub detail: Map<String, Value>,
}

impl MetricSample {
    /// Interpret a raw log record. Returns `None` when the record has no
    /// `type` or names a series this server does not track.
    pub fn from_record(mut record: Map<String, Value>) -> Option<Self> {
        let series = record
            .get("type")
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<Series>().ok())?;
        record.remove("type");

        let timestamp = match record.remove("timestamp") {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                record.insert("timestamp".to_string(), other);
                None
            }
            None => None,
        };
        let value = match record.remove("value") {
            Some(Value::Number(n)) => Some(n),
            Some(other) => {
                record.insert("value".to_string(), other);
                None
            }
            None => None,
        };

        Some(Self {
            series,
            timestamp,
            value,
            detail: record,
        })
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(Number::as_f64)
    }
}

/// Visual bucket for an issue's severity. The stored severity string is
/// never rewritten; anything that is not `HIGH` or `MEDIUM` lands in `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityClass {
    High,
    Medium,
    Low,
}

impl SeverityClass {
    pub fn classify(severity: Option<&str>) -> Self {
        match severity {
            Some("HIGH") => SeverityClass::High,
            Some("MEDIUM") => SeverityClass::Medium,
            _ => SeverityClass::Low,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            SeverityClass::High => "high",
            SeverityClass::Medium => "medium",
            SeverityClass::Low => "low",
        }
    }
}

/// One line of the security event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SecurityIssue {
    /// Issue records are untyped; any JSON object is an issue. String fields
    /// of the wrong type are kept in `extra` rather than dropped.
    pub fn from_record(mut record: Map<String, Value>) -> Self {
        let mut take = |key: &str| match record.remove(key) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                record.insert(key.to_string(), other);
                None
            }
            None => None,
        };
        let severity = take("severity");
        let message = take("message");
        let timestamp = take("timestamp");

        Self {
            severity,
            message,
            timestamp,
            extra: record,
        }
    }

    pub fn severity_class(&self) -> SeverityClass {
        SeverityClass::classify(self.severity.as_deref())
    }
}
