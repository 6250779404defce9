//! Live host facts, read from procfs and `/etc/os-release`.
//!
//! Used when no `system_info.json` snapshot exists, and for the CPU and
//! memory lines of the system page. Each fact is independently optional.

use std::fs;
use std::path::Path;

/// Facts collected from the running host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFacts {
    pub hostname: Option<String>,
    pub kernel: Option<String>,
    pub os_name: Option<String>,
    pub uptime_secs: Option<u64>,
    /// `"<model> (<n> cores)"`, or `None` when `/proc/cpuinfo` is unreadable.
    pub cpu_info: Option<String>,
    /// `MemTotal` from `/proc/meminfo`, e.g. `"16314500 kB"`.
    pub memory_info: Option<String>,
}

impl HostFacts {
    /// Read every fact from the local host.
    pub fn collect() -> Self {
        let hostname = read_trimmed("/proc/sys/kernel/hostname")
            .or_else(|| read_trimmed("/etc/hostname"));
        let kernel = read_trimmed("/proc/sys/kernel/osrelease");
        let os_name = fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|text| parse_os_release(&text));
        let uptime_secs = fs::read_to_string("/proc/uptime")
            .ok()
            .and_then(|text| parse_uptime(&text));

        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0);
        let cpu_info = fs::read_to_string("/proc/cpuinfo").ok().map(|text| {
            let model = parse_cpu_model(&text).unwrap_or_else(|| "Unknown".to_string());
            format!("{} ({} cores)", model, cores)
        });
        let memory_info = fs::read_to_string("/proc/meminfo")
            .ok()
            .map(|text| parse_mem_total(&text).unwrap_or_else(|| "Unknown".to_string()));

        Self {
            hostname,
            kernel,
            os_name,
            uptime_secs,
            cpu_info,
            memory_info,
        }
    }
}

fn read_trimmed(path: impl AsRef<Path>) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `PRETTY_NAME` from an os-release file, unquoted.
pub fn parse_os_release(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(key, _)| *key == "PRETTY_NAME")
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Whole seconds from the first field of `/proc/uptime`.
pub fn parse_uptime(text: &str) -> Option<u64> {
    let secs: f64 = text.split_whitespace().next()?.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then_some(secs as u64)
}

/// The first `model name` entry of `/proc/cpuinfo`.
pub fn parse_cpu_model(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

/// The `MemTotal` value of `/proc/meminfo`, unit included.
pub fn parse_mem_total(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains("MemTotal"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}
