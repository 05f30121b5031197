//! Tile every layer, then stack them into a cube.

use super::{CubeError, LayerSource, StackDriver, TileCommand};
use crate::grid::{GridSystem, Region};
use crate::jobs::{BatchSummary, JobBatch, Orchestrator};
use crate::process::CommandRunner;
use crate::pyramid::{reset_output_root, LevelRange};
use crate::raster::Resampling;
use std::path::PathBuf;
use tracing::{info, warn};

/// What a cube run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CubeReport {
    /// Layers handed to the tiler, by name
    pub tiled: Vec<String>,
    /// Sources not tiled because they, or the file paired with them, did
    /// not exist
    pub skipped: Vec<PathBuf>,
    pub tiling: BatchSummary,
    /// One summary per stacked level
    pub stacking: Vec<BatchSummary>,
}

/// Drives tiling of all layers followed by stacking.
pub struct CubePipeline<'a, G, R> {
    grid: &'a G,
    orchestrator: &'a Orchestrator<R>,
    program: PathBuf,
    tiles_root: PathBuf,
    cube_root: PathBuf,
    region: Region,
    levels: LevelRange,
    boundary: Option<PathBuf>,
    exclude: Option<PathBuf>,
    verbose: bool,
}

impl<'a, G: GridSystem, R: CommandRunner> CubePipeline<'a, G, R> {
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
            boundary: None,
            exclude: None,
            verbose: false,
        }
    }

    /// Boundary forwarded to every tiling run.
    pub fn with_boundary(mut self, boundary: Option<PathBuf>) -> Self {
        self.boundary = boundary;
        self
    }

    /// Exclusion list forwarded to every tiling run.
    pub fn with_exclusions(mut self, exclude: Option<PathBuf>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn tile_command(&self, source: &LayerSource) -> TileCommand {
        TileCommand {
            source: source.path.clone(),
            output: self.tiles_root.join(source.layer_name()),
            levels: self.levels,
            boundary: self.boundary.clone(),
            exclude: self.exclude.clone(),
            resampling: source.categorical.then_some(Resampling::Near),
            verbose: self.verbose,
        }
    }

    /// Tiles each existing source as its own layer, waits for all of them,
    /// then stacks the layers into the cube root.
    ///
    /// A source with a mask is skipped whole when either file is missing.
    pub async fn run(&self, sources: &[LayerSource]) -> Result<CubeReport, CubeError> {
        let mut report = CubeReport::default();
        let mut batch = JobBatch::new("tile layers");

        for unit in sources {
            let mut complete = true;
            for file in unit.files() {
                if !tokio::fs::try_exists(file).await.unwrap_or(false) {
                    warn!(path = %file.display(), "Layer source does not exist");
                    complete = false;
                }
            }
            if !complete {
                warn!(layer = %unit.layer_name(), "Skipping layer and its mask");
                report.skipped.extend(unit.files().cloned());
                continue;
            }

            for source in unit.tiled_sources() {
                let tile = self.tile_command(&source);
                info!(
                    layer = %source.layer_name(),
                    categorical = source.categorical,
                    "Tiling layer"
                );
                batch.push(self.orchestrator.submit(tile.to_command(&self.program)).await?);
                report.tiled.push(source.layer_name());
            }
        }
        report.tiling = self.orchestrator.barrier(batch).await;

        reset_output_root(&self.cube_root).await?;
        let driver = StackDriver::new(
            self.grid,
            self.orchestrator,
            self.program.clone(),
            self.tiles_root.clone(),
            self.cube_root.clone(),
            self.region,
            self.levels,
        )
        .verbose(self.verbose);
        report.stacking = driver.run().await?;
        Ok(report)
    }
}
