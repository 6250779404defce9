//! HTML page rendering.
//!
//! Each of the five pages has a fixed set of `{{name}}` placeholders. The
//! context for a page is built by one function per page from the matching
//! view, so the values supplied always cover the names declared. Templates
//! are read from the template directory on every request; a page whose
//! template is missing gets a generated fallback.

pub(crate) mod templates;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use uap_state::{BackupView, MonitoringView, SecurityView, Series, SystemView};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    Dashboard,
    System,
    Monitoring,
    Security,
    Backups,
}

impl Page {
    pub(crate) const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::System,
        Page::Monitoring,
        Page::Security,
        Page::Backups,
    ];

    /// Template file stem.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::System => "system",
            Page::Monitoring => "monitoring",
            Page::Security => "security",
            Page::Backups => "backups",
        }
    }

    /// Heading used by the fallback page.
    pub(crate) fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::System => "System Information",
            Page::Monitoring => "Monitoring Data",
            Page::Security => "Security Data",
            Page::Backups => "Backup Data",
        }
    }

    pub(crate) fn placeholders(self) -> &'static [&'static str] {
        match self {
            Page::Dashboard => &["hostname", "os_name", "uptime", "current_time"],
            Page::System => &[
                "hostname",
                "os_name",
                "kernel",
                "uptime",
                "cpu_info",
                "memory_info",
                "current_time",
            ],
            Page::Monitoring => &[
                "last_run",
                "alerts",
                "cpu_usage",
                "memory_usage",
                "disk_usage",
                "current_time",
            ],
            Page::Security => &[
                "last_scan",
                "total_issues",
                "high_issues",
                "medium_issues",
                "low_issues",
                "issues",
                "current_time",
            ],
            Page::Backups => &[
                "last_backup_time",
                "backup_location",
                "backup_dirs",
                "backups_list",
                "current_time",
            ],
        }
    }

    fn template_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.html", self.name()))
    }
}

/// Values for one page's placeholders. Values are inserted as-is; callers
/// escape text and build fragments before setting them.
#[derive(Debug, Clone)]
pub(crate) struct PageContext {
    page: Page,
    values: BTreeMap<&'static str, String>,
}

impl PageContext {
    fn new(page: Page, current_time: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert("current_time", escape_html(current_time));
        Self { page, values }
    }

    /// Set a declared placeholder to escaped text.
    fn text(self, name: &'static str, value: impl AsRef<str>) -> Self {
        self.raw(name, escape_html(value.as_ref()))
    }

    fn raw(mut self, name: &'static str, html: String) -> Self {
        debug_assert!(
            self.page.placeholders().contains(&name),
            "{name} is not a placeholder of {}",
            self.page.name()
        );
        self.values.insert(name, html);
        self
    }

    pub(crate) fn page(&self) -> Page {
        self.page
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Declared placeholders this context has no value for.
    pub(crate) fn missing(&self) -> Vec<&'static str> {
        self.page
            .placeholders()
            .iter()
            .copied()
            .filter(|name| !self.values.contains_key(name))
            .collect()
    }

    pub(crate) fn dashboard(system: &SystemView, current_time: &str) -> Self {
        Self::new(Page::Dashboard, current_time)
            .text("hostname", &system.hostname)
            .text("os_name", &system.os)
            .text("uptime", &system.uptime)
    }

    pub(crate) fn system(system: &SystemView, current_time: &str) -> Self {
        Self::new(Page::System, current_time)
            .text("hostname", &system.hostname)
            .text("os_name", &system.os)
            .text("kernel", &system.kernel)
            .text("uptime", &system.uptime)
            .text("cpu_info", &system.cpu_info)
            .text("memory_info", &system.memory_info)
    }

    pub(crate) fn monitoring(view: &MonitoringView, current_time: &str) -> Self {
        let usage = |series: Series| match view.current.get(series) {
            Some(value) => format!("{value:.1}%"),
            None => UNKNOWN.to_string(),
        };

        Self::new(Page::Monitoring, current_time)
            .text("last_run", &view.summary.timestamp)
            .text("alerts", view.summary.alerts.to_string())
            .text("cpu_usage", usage(Series::Cpu))
            .text("memory_usage", usage(Series::Memory))
            .text("disk_usage", usage(Series::Disk))
    }

    pub(crate) fn security(view: &SecurityView, current_time: &str) -> Self {
        let summary = &view.summary;
        Self::new(Page::Security, current_time)
            .text("last_scan", &summary.timestamp)
            .text("total_issues", summary.total_issues.to_string())
            .text("high_issues", summary.high_issues.to_string())
            .text("medium_issues", summary.medium_issues.to_string())
            .text("low_issues", summary.low_issues.to_string())
            .raw("issues", issues_fragment(view))
    }

    pub(crate) fn backups(view: &BackupView, current_time: &str) -> Self {
        let last = &view.last_backup;
        Self::new(Page::Backups, current_time)
            .text("last_backup_time", &last.timestamp)
            .text("backup_location", &last.location)
            .text("backup_dirs", &last.directories)
            .raw("backups_list", backups_fragment(view))
    }
}

fn issues_fragment(view: &SecurityView) -> String {
    let mut html = String::new();
    for issue in &view.issues {
        let _ = write!(
            html,
            "<div class=\"issue {}\"><span class=\"severity\">{}</span>\
             <span class=\"message\">{}</span><span class=\"timestamp\">{}</span></div>",
            issue.severity_class().css_class(),
            escape_html(issue.severity.as_deref().unwrap_or("UNKNOWN")),
            escape_html(issue.message.as_deref().unwrap_or("Unknown issue")),
            escape_html(issue.timestamp.as_deref().unwrap_or("Unknown time")),
        );
    }
    html
}

fn backups_fragment(view: &BackupView) -> String {
    let mut html = String::new();
    for backup in &view.backups {
        let _ = write!(
            html,
            "<div class=\"backup\"><span class=\"id\">{}</span>\
             <span class=\"date\">{}</span><span class=\"size\">{}</span></div>",
            escape_html(&backup.id),
            escape_html(&backup.date),
            escape_html(&backup.size),
        );
    }
    html
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Replace every `{{name}}` token that `context` has a value for, in one
/// pass. Substituted values are never rescanned. Tokens without a value are
/// left in place.
pub(crate) fn substitute(template: &str, context: &PageContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match context.get(name) {
            Some(value) => out.push_str(value),
            None => {
                tracing::debug!(
                    page = context.page().name(),
                    token = name,
                    "unknown placeholder"
                );
                out.push_str(&rest[start..start + 2 + end + 2]);
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Loads page templates and fills them in.
#[derive(Debug, Clone)]
pub(crate) struct PageRenderer {
    template_dir: PathBuf,
}

impl PageRenderer {
    pub(crate) fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    /// The page's template, or the generated fallback when it cannot be read.
    pub(crate) fn template(&self, page: Page) -> String {
        let path = page.template_path(&self.template_dir);
        match std::fs::read_to_string(&path) {
            Ok(template) => template,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), "template missing, using fallback");
                } else {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "template unreadable, using fallback"
                    );
                }
                templates::fallback_page(page.title())
            }
        }
    }

    pub(crate) fn render(&self, context: &PageContext) -> String {
        substitute(&self.template(context.page()), context)
    }
}
