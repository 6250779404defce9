//! Read side of the admin platform: locates the state artifacts written by
//! the maintenance jobs, parses them tolerantly, and merges them into the
//! per-domain views served as pages and JSON.
//!
//! Nothing in this crate writes to the data directory. Every read degrades
//! to defaults instead of failing: see [`ArtifactRead`].

mod domain;
mod error;
pub mod format;
pub mod host;
mod record;
mod store;
mod view;

pub use domain::{Domain, UnknownDomain};
pub use error::StateError;
pub use host::HostFacts;
pub use record::{
    BackupInfo, MetricSample, MonitoringSummary, SecurityIssue, SecuritySummary, Series,
    SeverityClass, SystemSnapshot,
};
pub use store::{
    ArtifactRead, BackupEntry, EventLog, StatePaths, StateStore, BACKUP_INFO_SNAPSHOT,
    LATEST_ALIAS, MONITORING_LOG, MONITORING_SNAPSHOT, SECURITY_LOG, SECURITY_SNAPSHOT,
    SYSTEM_SNAPSHOT,
};
pub use view::{
    build_backup_view, build_monitoring_view, build_security_view, build_system_view,
    BackupListing, BackupView, CurrentValues, DomainView, MonitoringView, SecurityView,
    SystemView, ViewSource,
};
