use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::TriggerError;
use crate::launcher::{Launcher, ProcessLauncher, ProcessOutput};
use crate::routine::{Routine, Routines};

/// Outcome of one routine run, as reported to the caller.
///
/// The captured streams are `output` and `error` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    pub message: String,
    #[serde(rename = "output")]
    pub stdout: String,
    #[serde(rename = "error")]
    pub stderr: String,
}

impl JobResult {
    fn from_output(routine: Routine, output: ProcessOutput) -> Self {
        Self {
            success: output.success,
            message: routine.outcome_message(output.success).to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// A result that carries only a failure description, for runs that
    /// never produced output.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Runs routines on demand, one in-flight run per routine.
#[derive(Clone)]
pub struct JobTrigger {
    routines: Arc<Routines>,
    launcher: Arc<dyn Launcher>,
    in_flight: Arc<[Arc<Mutex<()>>; 3]>,
}

impl JobTrigger {
    pub fn new(routines: Routines) -> Self {
        Self::with_launcher(routines, ProcessLauncher)
    }

    pub fn with_launcher(routines: Routines, launcher: impl Launcher) -> Self {
        Self {
            routines: Arc::new(routines),
            launcher: Arc::new(launcher),
            in_flight: Arc::new([
                Arc::new(Mutex::new(())),
                Arc::new(Mutex::new(())),
                Arc::new(Mutex::new(())),
            ]),
        }
    }

    pub fn routines(&self) -> &Routines {
        &self.routines
    }

    /// Whether a run of `routine` is currently in flight.
    pub fn is_running(&self, routine: Routine) -> bool {
        self.in_flight[routine.index()].try_lock().is_err()
    }

    /// Run `routine` to completion and report its outcome.
    ///
    /// The child runs in its own task, which holds the routine's in-flight
    /// slot until the process exits. Dropping the returned future (a client
    /// hanging up) does not stop the process or free the slot early.
    pub async fn trigger(&self, routine: Routine) -> Result<JobResult, TriggerError> {
        let slot = Arc::clone(&self.in_flight[routine.index()])
            .try_lock_owned()
            .map_err(|_| TriggerError::AlreadyRunning(routine))?;

        let command = self.routines.get(routine).clone();
        let launcher = Arc::clone(&self.launcher);
        tracing::info!(
            %routine,
            program = %command.program.display(),
            "starting routine"
        );

        let run = tokio::spawn(async move {
            let _slot = slot;
            let result = launcher.run(&command).await;
            (command, result)
        });

        let (command, result) = run.await.map_err(|e| TriggerError::Interrupted {
            routine,
            reason: e.to_string(),
        })?;

        match result {
            Ok(output) => {
                if output.success {
                    tracing::info!(%routine, "routine finished");
                } else {
                    tracing::warn!(%routine, code = ?output.code, "routine failed");
                }
                Ok(JobResult::from_output(routine, output))
            }
            Err(source) => {
                tracing::warn!(%routine, error = %source, "routine could not be started");
                Err(TriggerError::Launch {
                    routine,
                    program: command.program,
                    source,
                })
            }
        }
    }
}
