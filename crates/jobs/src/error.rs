use std::path::PathBuf;

use crate::routine::Routine;

/// Errors that prevent a routine from producing a result.
///
/// A routine that runs and exits non-zero is not an error; see
/// [`JobResult`](crate::JobResult).
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The program could not be started (missing, not executable, ...).
    #[error("failed to launch {routine} routine '{}': {source}", program.display())]
    Launch {
        routine: Routine,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run of the same routine is still in flight.
    #[error("{0} routine is already running")]
    AlreadyRunning(Routine),

    /// The task supervising the child process died before reporting.
    #[error("{routine} routine was interrupted: {reason}")]
    Interrupted { routine: Routine, reason: String },
}
