use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::routine::RoutineCommand;

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `true` exactly when the process exited with status 0.
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Starts a routine's program and waits for it to finish.
///
/// `Err` means the program could not be started; a program that ran and
/// failed is an `Ok` output with `success == false`.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    async fn run(&self, command: &RoutineCommand) -> std::io::Result<ProcessOutput>;
}

/// Runs routines as child processes. No timeout is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn run(&self, command: &RoutineCommand) -> std::io::Result<ProcessOutput> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = child.wait_with_output().await?;
        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
