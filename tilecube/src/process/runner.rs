//! Runner that spawns real operating-system processes.

use super::{CommandRunner, ProcessCommand, ProcessError, ProcessOutput};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Spawns commands with `tokio::process` and waits for them to exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let program = command.program().to_string();
        tracing::debug!(command = %command, "Spawning process");

        let mut child = Command::new(command.program())
            .args(command.get_args())
            .stdin(if command.get_stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let (Some(input), Some(mut stdin)) = (command.get_stdin(), child.stdin.take()) {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|source| ProcessError::Io {
                    program: program.clone(),
                    source,
                })?;
            // Close stdin so the child sees EOF
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ProcessError::Io { program, source })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
