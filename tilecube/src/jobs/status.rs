//! Job status codes.

use std::fmt;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Completing,
    Suspended,
    Succeeded,
    Failed,
    Cancelled,
    /// Terminal, outcome not observable
    Unknown,
}

impl JobStatus {
    /// Non-terminal states keep a barrier waiting.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Pending | Self::Running | Self::Completing | Self::Suspended
        )
    }

    /// Maps a SLURM compact state code (`squeue` `ST` column).
    pub fn from_slurm_code(code: &str) -> Self {
        match code {
            "PD" => Self::Pending,
            "R" => Self::Running,
            "CG" => Self::Completing,
            "S" => Self::Suspended,
            "CD" => Self::Succeeded,
            "CA" => Self::Cancelled,
            "F" | "TO" | "NF" | "OOM" | "BF" | "PR" | "DL" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completing => "completing",
            Self::Suspended => "suspended",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
