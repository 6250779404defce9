use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A maintenance routine that can be triggered on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Routine {
    Monitor,
    SecurityScan,
    Backup,
}

impl Routine {
    pub const ALL: [Routine; 3] = [Routine::Monitor, Routine::SecurityScan, Routine::Backup];

    pub fn as_str(self) -> &'static str {
        match self {
            Routine::Monitor => "monitor",
            Routine::SecurityScan => "security-scan",
            Routine::Backup => "backup",
        }
    }

    /// Fixed message reported for a run, chosen by outcome only.
    pub fn outcome_message(self, success: bool) -> &'static str {
        match (self, success) {
            (Routine::Monitor, true) => "Monitoring completed successfully",
            (Routine::Monitor, false) => "Monitoring failed",
            (Routine::SecurityScan, true) => "Security scan completed successfully",
            (Routine::SecurityScan, false) => "Security scan failed",
            (Routine::Backup, true) => "Backup completed successfully",
            (Routine::Backup, false) => "Backup failed",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Routine::Monitor => 0,
            Routine::SecurityScan => 1,
            Routine::Backup => 2,
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown routine '{0}' (expected monitor, security-scan or backup)")]
pub struct UnknownRoutine(pub String);

impl FromStr for Routine {
    type Err = UnknownRoutine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monitor" => Ok(Routine::Monitor),
            "security-scan" | "security_scan" => Ok(Routine::SecurityScan),
            "backup" => Ok(Routine::Backup),
            other => Err(UnknownRoutine(other.to_string())),
        }
    }
}

/// Program and arguments used to run a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl RoutineCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// The command for each routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routines {
    pub monitor: RoutineCommand,
    pub security_scan: RoutineCommand,
    pub backup: RoutineCommand,
}

impl Routines {
    /// The platform's standard script locations below `base_dir`.
    pub fn under(base_dir: &Path) -> Self {
        Self {
            monitor: RoutineCommand::new(base_dir.join("core").join("monitor.sh")),
            security_scan: RoutineCommand::new(base_dir.join("security").join("scanner.sh")),
            backup: RoutineCommand::new(base_dir.join("backup").join("backup.sh")).arg("backup"),
        }
    }

    pub fn get(&self, routine: Routine) -> &RoutineCommand {
        match routine {
            Routine::Monitor => &self.monitor,
            Routine::SecurityScan => &self.security_scan,
            Routine::Backup => &self.backup,
        }
    }
}
