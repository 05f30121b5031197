//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use std::path::PathBuf;
use tilecube::config::ConfigFile;
use tilecube::extent::{ExtentRequest, ExtentResolver};
use tilecube::grid::{NestedGrid, Region};
use tilecube::jobs::{Backend, BatchSummary, Orchestrator};
use tilecube::process::SystemCommandRunner;
use tilecube::pyramid::LevelRange;
use tilecube::raster::GdalTools;

use crate::error::CliError;

/// Where jobs run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Parallelism {
    /// Run every job locally, one after another
    #[default]
    None,
    /// Submit jobs to a SLURM cluster and wait for each level
    Cluster,
}

impl Parallelism {
    /// Backend for this mode, using the `[cluster]` settings.
    pub fn backend(self, config: &ConfigFile) -> Backend {
        match self {
            Parallelism::None => Backend::Local,
            Parallelism::Cluster => Backend::Cluster(config.cluster.to_cluster_config()),
        }
    }
}

/// GDAL tools driven through spawned processes.
pub type Tools = GdalTools<SystemCommandRunner>;

pub fn gdal_tools() -> Tools {
    GdalTools::new(SystemCommandRunner::new())
}

/// Orchestrator for `parallelism`, polling at the configured interval.
pub fn orchestrator(
    parallelism: Parallelism,
    config: &ConfigFile,
) -> Orchestrator<SystemCommandRunner> {
    Orchestrator::new(SystemCommandRunner::new(), parallelism.backend(config))
        .with_poll_interval(config.cluster.poll_interval())
}

/// Validates the level arguments against the grid's depth.
pub fn level_range(min: u8, max: u8) -> Result<LevelRange, CliError> {
    Ok(LevelRange::for_grid(min, max, &NestedGrid::new())?)
}

/// Path of the running binary, used for `tilecube` job commands.
pub fn current_program() -> Result<PathBuf, CliError> {
    std::env::current_exe().map_err(CliError::Program)
}

/// Resolves the target region; the configured default boundary is the
/// last resort.
pub async fn resolve_region(
    tools: &Tools,
    global: bool,
    boundary: Option<PathBuf>,
    raster: Option<PathBuf>,
    config: &ConfigFile,
) -> Result<Region, CliError> {
    let request = ExtentRequest {
        global,
        boundary,
        raster,
        default_boundary: config.extent.default_boundary.clone(),
    };
    let resolved = ExtentResolver::new(tools).resolve(&request).await?;
    println!("Extent:     {} ({})", resolved.region, resolved.source);
    Ok(resolved.region)
}

/// Prints one line per batch.
pub fn print_summaries<'a>(summaries: impl IntoIterator<Item = &'a BatchSummary>) {
    for summary in summaries {
        println!("  {}", summary);
    }
}
