//! Server configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags (and `UAP_PORT`), an optional TOML file passed with `--config`, and
//! defaults derived from the platform base directory.
//!
//! # Example
//!
//! ```toml
//! port = 8080
//! base_dir = "/opt/unix-admin-platform"
//! log_dir = "/opt/unix-admin-platform/logs"
//!
//! [routines.monitor]
//! program = "/opt/unix-admin-platform/core/monitor.sh"
//!
//! [routines.backup]
//! program = "/opt/unix-admin-platform/backup/backup.sh"
//! args = ["backup"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use uap_jobs::{RoutineCommand, Routines};
use uap_state::StatePaths;

/// Port used when neither a flag, the environment, nor the file sets one.
pub(crate) const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The TOML file as written. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub port: Option<u16>,
    pub base_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub routines: RoutineOverrides,
}

/// `[routines.*]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RoutineOverrides {
    pub monitor: Option<RoutineCommand>,
    pub security_scan: Option<RoutineCommand>,
    pub backup: Option<RoutineCommand>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct CliOverrides {
    pub port: Option<u16>,
    pub base_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved configuration handed to the server and the commands.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub port: u16,
    pub state: StatePaths,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub routines: Routines,
}

impl Config {
    /// Merge the file layer and the command-line layer over the defaults.
    pub(crate) fn resolve(file: FileConfig, cli: CliOverrides) -> Self {
        let base_dir = cli
            .base_dir
            .or(file.base_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let data_dir = cli
            .data_dir
            .or(file.data_dir)
            .unwrap_or_else(|| base_dir.join("data"));
        let backup_dir = file
            .backup_dir
            .unwrap_or_else(|| data_dir.join("backups"));
        let template_dir = file
            .template_dir
            .unwrap_or_else(|| base_dir.join("web").join("templates"));
        let static_dir = file
            .static_dir
            .unwrap_or_else(|| base_dir.join("web").join("static"));

        let defaults = Routines::under(&base_dir);
        let routines = Routines {
            monitor: file.routines.monitor.unwrap_or(defaults.monitor),
            security_scan: file.routines.security_scan.unwrap_or(defaults.security_scan),
            backup: file.routines.backup.unwrap_or(defaults.backup),
        };

        Self {
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            state: StatePaths {
                data_dir,
                backup_dir,
            },
            template_dir,
            static_dir,
            log_dir: file.log_dir,
            routines,
        }
    }
}

/// Read and parse a TOML configuration file.
pub(crate) fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the optional file and resolve it against the command line.
pub(crate) fn load(path: Option<&Path>, cli: CliOverrides) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => FileConfig::default(),
    };
    Ok(Config::resolve(file, cli))
}
