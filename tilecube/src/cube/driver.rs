//! Level-by-level dispatch of per-cell stacking.

use super::{stack_tile_command, CubeError};
use crate::grid::{GridSystem, Region};
use crate::jobs::{BatchSummary, JobBatch, Orchestrator};
use crate::process::CommandRunner;
use crate::pyramid::LevelRange;
use std::path::PathBuf;
use tracing::info;

/// Submits one `stack-tile` process per covering cell, finest level first,
/// with a barrier after each level.
pub struct StackDriver<'a, G, R> {
    grid: &'a G,
    orchestrator: &'a Orchestrator<R>,
    program: PathBuf,
    tiles_root: PathBuf,
    cube_root: PathBuf,
    region: Region,
    levels: LevelRange,
    verbose: bool,
}

impl<'a, G: GridSystem, R: CommandRunner> StackDriver<'a, G, R> {
    pub fn new(
        grid: &'a G,
        orchestrator: &'a Orchestrator<R>,
        program: impl Into<PathBuf>,
        tiles_root: impl Into<PathBuf>,
        cube_root: impl Into<PathBuf>,
        region: Region,
        levels: LevelRange,
    ) -> Self {
        Self {
            grid,
            orchestrator,
            program: program.into(),
            tiles_root: tiles_root.into(),
            cube_root: cube_root.into(),
            region,
            levels,
            verbose: false,
        }
    }

    /// Forwards `--verbose` to every stacking process.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Dispatches every level and returns one summary per level.
    pub async fn run(&self) -> Result<Vec<BatchSummary>, CubeError> {
        info!(
            tiles = %self.tiles_root.display(),
            cube = %self.cube_root.display(),
            region = %self.region,
            "Stacking layers"
        );
        let mut summaries = Vec::new();
        for level in self.levels.descending() {
            let covering = self.grid.covering_grid(level, &self.region)?;
            let mut batch = JobBatch::new(format!("stack level {}", level));
            for cell in covering.cells() {
                let command = stack_tile_command(
                    &self.program,
                    &cell.address,
                    &self.tiles_root,
                    &self.cube_root,
                    self.verbose,
                );
                batch.push(self.orchestrator.submit(command).await?);
            }
            summaries.push(self.orchestrator.barrier(batch).await);
        }
        Ok(summaries)
    }
}
