use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four administrative subject areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    System,
    Monitoring,
    Security,
    Backup,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::System,
        Domain::Monitoring,
        Domain::Security,
        Domain::Backup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::System => "system",
            Domain::Monitoring => "monitoring",
            Domain::Security => "security",
            Domain::Backup => "backup",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown domain '{0}' (expected system, monitoring, security or backups)")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Domain::System),
            "monitoring" => Ok(Domain::Monitoring),
            "security" => Ok(Domain::Security),
            // The HTTP surface and the page are plural.
            "backup" | "backups" => Ok(Domain::Backup),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural_backup() {
        assert_eq!("backup".parse::<Domain>().unwrap(), Domain::Backup);
        assert_eq!("backups".parse::<Domain>().unwrap(), Domain::Backup);
    }

    #[test]
    fn rejects_unknown() {
        let err = "network".parse::<Domain>().unwrap_err();
        assert!(err.to_string().contains("network"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for domain in Domain::ALL {
            assert_eq!(domain.to_string().parse::<Domain>().unwrap(), domain);
        }
    }
}
