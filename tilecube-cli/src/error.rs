//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilecube::address::AddressError;
use tilecube::config::ConfigFileError;
use tilecube::cube::CubeError;
use tilecube::extent::ExtentError;
use tilecube::grid::GridError;
use tilecube::jobs::JobError;
use tilecube::pyramid::PyramidError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Minimum level above maximum level
    InvalidLevels { min: u8, max: u8 },
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Path of the running executable could not be determined
    Program(std::io::Error),
    /// Invalid cell address argument
    Address(AddressError),
    /// Cell address the grid does not contain
    Cell(GridError),
    /// Target extent could not be resolved
    Extent(ExtentError),
    /// Pyramid build failed
    Pyramid(PyramidError),
    /// Stacking failed
    Cube(CubeError),
    /// A job could not be submitted
    Job(JobError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Extent(ExtentError::NoSource) => {
                eprintln!();
                eprintln!("Give the target extent with one of:");
                eprintln!("  --global             the whole globe");
                eprintln!("  --boundary <PATH>    a vector file in longitude/latitude");
                eprintln!("  extent.default_boundary in config.ini");
            }
            CliError::Job(JobError::Template { .. })
            | CliError::Pyramid(PyramidError::Job(JobError::Template { .. }))
            | CliError::Cube(CubeError::Job(JobError::Template { .. })) => {
                eprintln!();
                eprintln!("Cluster runs need a batch script header.");
                eprintln!("Set cluster.job_template in config.ini or create template.sl");
                eprintln!("in the working directory.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidLevels { min, max } => write!(
                f,
                "Configuration error: minimum level {} is greater than maximum level {}",
                min, max
            ),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Program(e) => write!(f, "Cannot locate the tilecube executable: {}", e),
            CliError::Address(e) => write!(f, "Invalid cell: {}", e),
            CliError::Cell(e) => write!(f, "Invalid cell: {}", e),
            CliError::Extent(e) => write!(f, "Cannot determine target extent: {}", e),
            CliError::Pyramid(e) => write!(f, "Tiling failed: {}", e),
            CliError::Cube(e) => write!(f, "Stacking failed: {}", e),
            CliError::Job(e) => write!(f, "Job submission failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) | CliError::Program(e) => Some(e),
            CliError::Address(e) => Some(e),
            CliError::Cell(e) => Some(e),
            CliError::Extent(e) => Some(e),
            CliError::Pyramid(e) => Some(e),
            CliError::Cube(e) => Some(e),
            CliError::Job(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AddressError> for CliError {
    fn from(e: AddressError) -> Self {
        CliError::Address(e)
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        CliError::Cell(e)
    }
}

impl From<ExtentError> for CliError {
    fn from(e: ExtentError) -> Self {
        CliError::Extent(e)
    }
}

impl From<PyramidError> for CliError {
    fn from(e: PyramidError) -> Self {
        match e {
            PyramidError::InvalidLevels { min, max } => CliError::InvalidLevels { min, max },
            e @ PyramidError::LevelTooDeep { .. } => CliError::Config(e.to_string()),
            e => CliError::Pyramid(e),
        }
    }
}

impl From<CubeError> for CliError {
    fn from(e: CubeError) -> Self {
        CliError::Cube(e)
    }
}

impl From<JobError> for CliError {
    fn from(e: JobError) -> Self {
        CliError::Job(e)
    }
}
