//! Job trigger for the admin platform's maintenance routines.
//!
//! A routine (monitor, security scan, backup) is an external program. The
//! trigger runs it to completion, captures both output streams and the exit
//! status, and reports a [`JobResult`]. Exit status 0 is success; anything
//! else is a failed run, not an error. Only failing to start the program at
//! all is an error.
//!
//! At most one run per routine is in flight. A trigger that arrives while the
//! same routine is still running is refused with
//! [`TriggerError::AlreadyRunning`].

mod error;
mod launcher;
mod routine;
mod trigger;

pub use error::TriggerError;
pub use launcher::{Launcher, ProcessLauncher, ProcessOutput};
pub use routine::{Routine, RoutineCommand, Routines, UnknownRoutine};
pub use trigger::{JobResult, JobTrigger};
