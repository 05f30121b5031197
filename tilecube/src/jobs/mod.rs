//! Job orchestration.
//!
//! Every tile build is an external process. The [`Orchestrator`] runs it
//! either locally (to completion, one at a time) or on a SLURM cluster
//! (submitted and later polled). Jobs submitted for one pyramid level are
//! collected in a [`JobBatch`]; [`Orchestrator::barrier`] consumes the
//! batch once every job is terminal.
//!
//! # Job lifecycle
//!
//! ```text
//!   submit ──► Pending ──► Running ──► Completing ──► Succeeded
//!                 │           │                       Failed
//!                 └─► Suspended                       Cancelled
//!                                                     Unknown
//! ```
//!
//! `Unknown` is terminal: the job vanished from the scheduler, the status
//! query failed, or a local process could not be started. It is never
//! folded into `Succeeded` or `Failed`.

mod batch;
mod orchestrator;
mod slurm;
mod status;

pub use batch::{BatchSummary, Job, JobBatch, JobId};
pub use orchestrator::{Backend, Orchestrator, DEFAULT_POLL_INTERVAL};
pub use slurm::{parse_status_output, parse_submission_ack, ClusterConfig};
pub use status::JobStatus;

use crate::process::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from job submission.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to read job template '{path}': {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write job file '{path}': {source}")]
    JobFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Job submission failed (exit code {code:?}): {stderr}")]
    Rejected { code: Option<i32>, stderr: String },

    #[error("Unrecognised submission acknowledgement: '{0}'")]
    Acknowledgement(String),
}
