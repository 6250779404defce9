use std::path::PathBuf;

/// Why a state artifact could not be used.
///
/// These never reach an HTTP client. The store wraps them in
/// [`ArtifactRead::Unreadable`](crate::ArtifactRead::Unreadable) so callers
/// can log the cause and fall back to defaults.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The file exists but could not be read (permissions, I/O failure).
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a JSON document of the expected shape.
    #[error("could not parse '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
