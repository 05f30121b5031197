//! SLURM job files and scheduler output parsing.

use super::{JobError, JobStatus};
use crate::process::ProcessCommand;
use std::path::PathBuf;

/// Position of the job id in `Submitted batch job <id>`.
const SUBMIT_TOKEN: usize = 3;

/// Position of the `ST` value in `squeue -j <id>` output: eight header
/// columns, then JOBID PARTITION NAME USER ST.
const STATUS_TOKEN: usize = 12;

/// Cluster backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Batch script header the command is appended to
    pub job_template: PathBuf,
    /// Where the combined script is written before each submission
    pub job_file: PathBuf,
    pub submit_program: String,
    pub status_program: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            job_template: PathBuf::from("template.sl"),
            job_file: PathBuf::from("jobfile.sl"),
            submit_program: "sbatch".to_string(),
            status_program: "squeue".to_string(),
        }
    }
}

impl ClusterConfig {
    /// Writes the job file: template text followed by the command line.
    pub async fn write_job_file(&self, command: &ProcessCommand) -> Result<(), JobError> {
        let mut script = tokio::fs::read_to_string(&self.job_template)
            .await
            .map_err(|source| JobError::Template {
                path: self.job_template.clone(),
                source,
            })?;
        if !script.is_empty() && !script.ends_with('\n') {
            script.push('\n');
        }
        script.push_str(&command.shell_line());
        script.push('\n');

        tokio::fs::write(&self.job_file, script)
            .await
            .map_err(|source| JobError::JobFile {
                path: self.job_file.clone(),
                source,
            })
    }

    pub fn submit_command(&self) -> ProcessCommand {
        ProcessCommand::new(&self.submit_program).path_arg(&self.job_file)
    }

    pub fn status_command(&self, handle: &str) -> ProcessCommand {
        ProcessCommand::new(&self.status_program).args(["-j", handle])
    }
}

/// Extracts the job id from a submission acknowledgement.
pub fn parse_submission_ack(stdout: &str) -> Option<String> {
    stdout
        .split_whitespace()
        .nth(SUBMIT_TOKEN)
        .map(str::to_string)
}

/// Extracts the job status from `squeue -j` output.
///
/// `None` when the job row is absent, which happens once the scheduler
/// has purged it.
pub fn parse_status_output(stdout: &str) -> Option<JobStatus> {
    stdout
        .split_whitespace()
        .nth(STATUS_TOKEN)
        .map(JobStatus::from_slurm_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SQUEUE_RUNNING: &str = "\
             JOBID PARTITION     NAME     USER ST       TIME  NODES NODELIST(REASON)
            482913     batch  jobfile    alice  R       0:42      1 node017
";

    #[test]
    fn test_parse_submission_ack() {
        assert_eq!(
            parse_submission_ack("Submitted batch job 482913\n"),
            Some("482913".to_string())
        );
        assert_eq!(parse_submission_ack("sbatch: error"), None);
    }

    #[test]
    fn test_parse_status_output() {
        assert_eq!(parse_status_output(SQUEUE_RUNNING), Some(JobStatus::Running));
        let pending = SQUEUE_RUNNING.replace(" R  ", " PD ");
        assert_eq!(parse_status_output(&pending), Some(JobStatus::Pending));
    }

    #[test]
    fn test_header_only_output_has_no_status() {
        let header = "JOBID PARTITION NAME USER ST TIME NODES NODELIST(REASON)\n";
        assert_eq!(parse_status_output(header), None);
    }

    #[test]
    fn test_commands() {
        let config = ClusterConfig::default();
        let submit = config.submit_command();
        assert_eq!(submit.program(), "sbatch");
        assert_eq!(submit.get_args(), &["jobfile.sl"]);
        assert_eq!(config.status_command("42").get_args(), &["-j", "42"]);
    }

    #[tokio::test]
    async fn test_write_job_file_appends_command() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.sl");
        std::fs::write(&template, "#!/bin/bash\n#SBATCH --time=01:00:00").unwrap();
        let config = ClusterConfig {
            job_template: template,
            job_file: dir.path().join("jobfile.sl"),
            ..Default::default()
        };
        let command = ProcessCommand::new("gdalwarp").args(["-r", "near", "/a b/in.tif"]);

        config.write_job_file(&command).await.unwrap();

        let written = std::fs::read_to_string(&config.job_file).unwrap();
        assert_eq!(
            written,
            "#!/bin/bash\n#SBATCH --time=01:00:00\ngdalwarp -r near '/a b/in.tif'\n"
        );
    }

    #[tokio::test]
    async fn test_missing_template() {
        let dir = TempDir::new().unwrap();
        let config = ClusterConfig {
            job_template: dir.path().join("absent.sl"),
            job_file: dir.path().join("jobfile.sl"),
            ..Default::default()
        };
        let result = config.write_job_file(&ProcessCommand::new("true")).await;
        assert!(matches!(result, Err(JobError::Template { .. })));
    }
}
