//! Human-readable formatting shared by the views and the page renderer.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Length of the `YYYYMMDD_HHMMSS` prefix of a backup directory name.
const BACKUP_STAMP_LEN: usize = 15;

/// Format a byte count with base-1024 scaling and two decimals.
///
/// Exactly zero is `"0B"`; everything else is `"<n.nn> <unit>"` in the
/// largest unit that keeps the value at or above 1.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, SIZE_UNITS[unit])
}

/// Format an uptime in seconds the way the dashboard shows it.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{} days, {} hours, {} minutes", days, hours, minutes)
    } else if hours > 0 {
        format!("{} hours, {} minutes", hours, minutes)
    } else {
        format!("{} minutes", minutes)
    }
}

/// Turn a backup directory name into a display date.
///
/// Names start with a `YYYYMMDD_HHMMSS` token (anything after it is
/// ignored). Names that do not start with a valid token are returned as is.
/// The token must be a real calendar date and time, not just eight digits,
/// an underscore and six digits: `20230230_000000` is shown raw.
pub fn backup_date(name: &str) -> String {
    let token = match name.get(..BACKUP_STAMP_LEN) {
        Some(token) if token.as_bytes()[8] == b'_' => token,
        _ => return name.to_string(),
    };

    PrimitiveDateTime::parse(
        token,
        format_description!("[year][month][day]_[hour][minute][second]"),
    )
    .ok()
    .and_then(|stamp| {
        stamp
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .ok()
    })
    .unwrap_or_else(|| name.to_string())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// Current local time, or UTC when the local offset cannot be determined
/// (the offset lookup is refused in multi-threaded processes on some
/// platforms).
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
