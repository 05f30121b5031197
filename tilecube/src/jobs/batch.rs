//! Jobs, batches and barrier summaries.

use super::JobStatus;
use crate::process::ProcessCommand;
use std::fmt;

/// Identifier assigned by the orchestrator, unique per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// A submitted unit of external work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub command: ProcessCommand,
    /// Scheduler job identifier; only set for cluster jobs
    pub handle: Option<String>,
    pub status: JobStatus,
}

/// Jobs submitted for one pyramid level.
#[derive(Debug, Clone, Default)]
pub struct JobBatch {
    label: String,
    jobs: Vec<Job>,
}

impl JobBatch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            jobs: Vec::new(),
        }
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(super) fn into_parts(self) -> (String, Vec<Job>) {
        (self.label, self.jobs)
    }
}

/// Terminal status counts of a batch after its barrier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub label: String,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub unknown: usize,
}

impl BatchSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Counts one terminal status.
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Succeeded => self.succeeded += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Cancelled => self.cancelled += 1,
            _ => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled + self.unknown
    }

    pub fn all_succeeded(&self) -> bool {
        self.total() == self.succeeded
    }

    /// Adds another summary's counts to this one.
    pub fn merge(&mut self, other: &BatchSummary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.cancelled += other.cancelled;
        self.unknown += other.unknown;
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} jobs ({} succeeded, {} failed, {} cancelled, {} unknown)",
            self.label,
            self.total(),
            self.succeeded,
            self.failed,
            self.cancelled,
            self.unknown
        )
    }
}
