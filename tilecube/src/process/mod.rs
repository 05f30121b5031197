//! Typed process invocation.
//!
//! All external work (warping, statistics, scheduler calls) goes through a
//! [`ProcessCommand`]: a program plus an argument list, never a shell
//! string. A [`CommandRunner`] executes it; tests substitute their own
//! runner to observe and simulate commands.

mod command;
mod runner;

pub use command::{ProcessCommand, ProcessOutput};
pub use runner::SystemCommandRunner;

use std::future::Future;
use thiserror::Error;

/// Errors from launching a process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing stdin or collecting output failed
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Executes process commands.
///
/// Implementations must be `Send + Sync` so one runner can be shared by the
/// orchestrator and the raster engine.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion and captures its output.
    ///
    /// A non-zero exit status is not an error at this layer; callers
    /// inspect [`ProcessOutput::success`].
    fn run(
        &self,
        command: &ProcessCommand,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send;
}

impl<R: CommandRunner> CommandRunner for &R {
    fn run(
        &self,
        command: &ProcessCommand,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        (**self).run(command)
    }
}

impl<R: CommandRunner> CommandRunner for std::sync::Arc<R> {
    fn run(
        &self,
        command: &ProcessCommand,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        (**self).run(command)
    }
}
