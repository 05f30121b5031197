//! The job orchestrator.

use super::slurm::{parse_status_output, parse_submission_ack};
use super::{BatchSummary, ClusterConfig, Job, JobBatch, JobError, JobId, JobStatus};
use crate::process::{CommandRunner, ProcessCommand};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Interval between scheduler status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where submitted jobs run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backend {
    /// Run each job to completion at submission
    #[default]
    Local,
    /// Submit to a SLURM cluster and poll at the barrier
    Cluster(ClusterConfig),
}

impl Backend {
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }
}

/// Runs and tracks build jobs.
pub struct Orchestrator<R> {
    runner: R,
    backend: Backend,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, backend: Backend) -> Self {
        Self {
            runner,
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn next_id(&self) -> JobId {
        JobId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Submits a command to the configured backend.
    ///
    /// Local jobs are already terminal when this returns; a failing local
    /// process is logged and reported through its status, not as an error.
    /// For the cluster backend an error means the job was not queued.
    pub async fn submit(&self, command: ProcessCommand) -> Result<Job, JobError> {
        let id = self.next_id();
        match &self.backend {
            Backend::Local => {
                let status = match self.run(&command).await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(job = %id, error = %e, "Job could not be started");
                        JobStatus::Unknown
                    }
                };
                Ok(Job {
                    id,
                    command,
                    handle: None,
                    status,
                })
            }
            Backend::Cluster(config) => {
                config.write_job_file(&command).await?;
                let output = self.runner.run(&config.submit_command()).await?;
                if !output.success() {
                    return Err(JobError::Rejected {
                        code: output.code,
                        stderr: output.stderr.trim().to_string(),
                    });
                }
                let handle = parse_submission_ack(&output.stdout)
                    .ok_or_else(|| JobError::Acknowledgement(output.stdout.trim().to_string()))?;
                debug!(job = %id, handle = %handle, command = %command, "Submitted cluster job");
                Ok(Job {
                    id,
                    command,
                    handle: Some(handle),
                    status: JobStatus::Pending,
                })
            }
        }
    }

    /// Runs a command locally to completion, whatever the backend.
    pub async fn run(&self, command: &ProcessCommand) -> Result<JobStatus, JobError> {
        debug!(command = %command, "Running job");
        let output = self.runner.run(command).await?;
        if output.success() {
            Ok(JobStatus::Succeeded)
        } else {
            warn!(
                program = command.program(),
                code = ?output.code,
                stderr = %output.stderr.trim(),
                "Job exited unsuccessfully"
            );
            Ok(JobStatus::Failed)
        }
    }

    /// Waits until every job in `batch` is terminal.
    ///
    /// Polls each non-terminal job at the fixed interval, with no timeout.
    /// A failed status query or a job missing from the scheduler ends
    /// polling for that job as `Unknown`.
    pub async fn barrier(&self, batch: JobBatch) -> BatchSummary {
        let (label, jobs) = batch.into_parts();
        let mut summary = BatchSummary::new(label);
        if jobs.is_empty() {
            debug!(batch = %summary.label, "Empty batch, nothing to wait for");
            return summary;
        }

        info!(batch = %summary.label, jobs = jobs.len(), "Waiting for batch");
        for mut job in jobs {
            while !job.status.is_terminal() {
                tokio::time::sleep(self.poll_interval).await;
                job.status = self.query_status(&job).await;
            }
            match job.status {
                JobStatus::Succeeded => {}
                status => warn!(
                    job = %job.id,
                    handle = job.handle.as_deref().unwrap_or("-"),
                    status = %status,
                    command = %job.command,
                    "Job did not succeed"
                ),
            }
            summary.record(job.status);
        }

        info!(summary = %summary, "Batch complete");
        summary
    }

    async fn query_status(&self, job: &Job) -> JobStatus {
        let (Backend::Cluster(config), Some(handle)) = (&self.backend, job.handle.as_deref())
        else {
            return JobStatus::Unknown;
        };

        match self.runner.run(&config.status_command(handle)).await {
            Ok(output) if output.success() => {
                parse_status_output(&output.stdout).unwrap_or(JobStatus::Unknown)
            }
            Ok(output) => {
                debug!(handle, code = ?output.code, "Status query failed, job presumed gone");
                JobStatus::Unknown
            }
            Err(e) => {
                debug!(handle, error = %e, "Status query could not run");
                JobStatus::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessError, ProcessOutput};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Local runner: succeeds unless the program is `false`.
    #[derive(Default)]
    struct LocalRunner {
        runs: Mutex<Vec<String>>,
    }

    impl CommandRunner for LocalRunner {
        async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
            self.runs.lock().unwrap().push(command.shell_line());
            match command.program() {
                "false" => Ok(ProcessOutput::failed(1, "boom")),
                "missing" => Err(ProcessError::Spawn {
                    program: "missing".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
                _ => Ok(ProcessOutput::ok("")),
            }
        }
    }

    /// Simulated SLURM: each submitted job replays a list of `ST` codes,
    /// then disappears.
    struct FakeSlurm {
        script: Vec<&'static str>,
        next: Mutex<u32>,
        states: Mutex<HashMap<String, VecDeque<&'static str>>>,
        queries: Mutex<usize>,
    }

    impl FakeSlurm {
        fn new(script: Vec<&'static str>) -> Self {
            Self {
                script,
                next: Mutex::new(100),
                states: Mutex::default(),
                queries: Mutex::new(0),
            }
        }
    }

    impl CommandRunner for FakeSlurm {
        async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
            match command.program() {
                "sbatch" => {
                    let mut next = self.next.lock().unwrap();
                    *next += 1;
                    self.states
                        .lock()
                        .unwrap()
                        .insert(next.to_string(), self.script.iter().copied().collect());
                    Ok(ProcessOutput::ok(format!("Submitted batch job {}\n", next)))
                }
                "squeue" => {
                    *self.queries.lock().unwrap() += 1;
                    let handle = &command.get_args()[1];
                    let state = self
                        .states
                        .lock()
                        .unwrap()
                        .get_mut(handle)
                        .and_then(VecDeque::pop_front);
                    match state {
                        Some(st) => Ok(ProcessOutput::ok(format!(
                            "JOBID PARTITION NAME USER ST TIME NODES NODELIST(REASON)\n{} batch jobfile user {} 0:01 1 n1\n",
                            handle, st
                        ))),
                        None => Ok(ProcessOutput::failed(
                            1,
                            "slurm_load_jobs error: Invalid job id specified",
                        )),
                    }
                }
                other => panic!("unexpected program {other}"),
            }
        }
    }

    fn cluster_backend(dir: &TempDir) -> Backend {
        let template = dir.path().join("template.sl");
        std::fs::write(&template, "#!/bin/bash\n").unwrap();
        Backend::Cluster(ClusterConfig {
            job_template: template,
            job_file: dir.path().join("jobfile.sl"),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_local_submit_is_terminal() {
        let orchestrator = Orchestrator::new(LocalRunner::default(), Backend::Local);
        let ok = orchestrator.submit(ProcessCommand::new("true")).await.unwrap();
        let bad = orchestrator.submit(ProcessCommand::new("false")).await.unwrap();
        let gone = orchestrator.submit(ProcessCommand::new("missing")).await.unwrap();

        assert_eq!(ok.status, JobStatus::Succeeded);
        assert_eq!(bad.status, JobStatus::Failed);
        assert_eq!(gone.status, JobStatus::Unknown);
        assert_ne!(ok.id, bad.id);
        assert!(ok.handle.is_none());
    }

    #[tokio::test]
    async fn test_run_propagates_spawn_errors() {
        let orchestrator = Orchestrator::new(LocalRunner::default(), Backend::Local);
        assert!(orchestrator.run(&ProcessCommand::new("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_barrier_returns_immediately() {
        let orchestrator = Orchestrator::new(LocalRunner::default(), Backend::Local);
        let summary = orchestrator.barrier(JobBatch::new("level 0")).await;
        assert_eq!(summary.total(), 0);
        assert!(orchestrator.runner().runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_barrier_summarises() {
        let orchestrator = Orchestrator::new(LocalRunner::default(), Backend::Local);
        let mut batch = JobBatch::new("level 2");
        for program in ["true", "false", "true"] {
            batch.push(orchestrator.submit(ProcessCommand::new(program)).await.unwrap());
        }
        let summary = orchestrator.barrier(batch).await;
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_barrier_polls_until_terminal() {
        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(
            FakeSlurm::new(vec!["PD", "R", "CG", "CD"]),
            cluster_backend(&dir),
        );

        let job = orchestrator
            .submit(ProcessCommand::new("gdalwarp").arg("in.tif"))
            .await
            .unwrap();
        assert_eq!(job.handle.as_deref(), Some("101"));
        assert_eq!(job.status, JobStatus::Pending);

        let mut batch = JobBatch::new("level 1");
        batch.push(job);
        let summary = orchestrator.barrier(batch).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(*orchestrator.runner().queries.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_job_is_unknown() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            Orchestrator::new(FakeSlurm::new(vec!["R", "R"]), cluster_backend(&dir));

        let mut batch = JobBatch::new("level 1");
        batch.push(orchestrator.submit(ProcessCommand::new("a")).await.unwrap());
        batch.push(orchestrator.submit(ProcessCommand::new("b")).await.unwrap());
        let summary = orchestrator.barrier(batch).await;

        assert_eq!(summary.unknown, 2);
        assert_eq!(summary.succeeded, 0);
        // Two running observations each, then the purge
        assert_eq!(*orchestrator.runner().queries.lock().unwrap(), 6);
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        struct Rejecting;
        impl CommandRunner for Rejecting {
            async fn run(&self, _command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
                Ok(ProcessOutput::failed(1, "sbatch: error: invalid partition"))
            }
        }

        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(Rejecting, cluster_backend(&dir));
        let result = orchestrator.submit(ProcessCommand::new("a")).await;
        assert!(matches!(result, Err(JobError::Rejected { code: Some(1), .. })));
    }

    #[tokio::test]
    async fn test_job_file_written_before_submission() {
        let dir = TempDir::new().unwrap();
        let backend = cluster_backend(&dir);
        let orchestrator = Orchestrator::new(FakeSlurm::new(vec![]), backend);
        orchestrator
            .submit(ProcessCommand::new("gdalwarp").arg("x.tif"))
            .await
            .unwrap();
        let script = std::fs::read_to_string(dir.path().join("jobfile.sl")).unwrap();
        assert_eq!(script, "#!/bin/bash\ngdalwarp x.tif\n");
    }
}
