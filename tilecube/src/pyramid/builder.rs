//! Level-ordered pyramid builds.

use super::{EmptyTilePruner, ExclusionSet, LevelRange, PruneOutcome, PyramidConfig, PyramidError};
use crate::address::tile_path;
use crate::extent::SourceDescription;
use crate::grid::{Cell, CoveringGrid, GridSystem, Region};
use crate::jobs::{BatchSummary, JobBatch, Orchestrator};
use crate::process::CommandRunner;
use crate::raster::{RasterEngine, WarpRequest};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The raster the finest level is warped from.
#[derive(Debug, Clone)]
pub struct TileSource {
    pub path: PathBuf,
    pub description: SourceDescription,
}

/// What the builder will do for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum TileAction {
    /// Build the tile with this warp
    Warp(WarpRequest),
    /// Finest-level cell on the exclusion list
    Excluded,
    /// Coarser cell none of whose children exist
    NoChildren,
}

/// One cell of a level plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTile {
    pub cell: Cell,
    pub path: PathBuf,
    pub action: TileAction,
}

impl PlannedTile {
    pub fn request(&self) -> Option<&WarpRequest> {
        match &self.action {
            TileAction::Warp(request) => Some(request),
            _ => None,
        }
    }
}

/// Outcome of building one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReport {
    pub level: u8,
    /// Cells in the covering grid
    pub planned: usize,
    pub skipped_excluded: usize,
    pub skipped_no_children: usize,
    pub submitted: usize,
    pub pruned: usize,
    /// Tiles left on disk after pruning
    pub kept: usize,
    pub jobs: BatchSummary,
}

impl LevelReport {
    fn new(level: u8, planned: usize) -> Self {
        Self {
            level,
            planned,
            skipped_excluded: 0,
            skipped_no_children: 0,
            submitted: 0,
            pruned: 0,
            kept: 0,
            jobs: BatchSummary::new(level_label(level)),
        }
    }
}

impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {}: {} cells, {} submitted, {} excluded, {} without children, {} pruned, {} kept",
            self.level,
            self.planned,
            self.submitted,
            self.skipped_excluded,
            self.skipped_no_children,
            self.pruned,
            self.kept
        )
    }
}

/// Per-level reports, finest level first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyramidReport {
    pub levels: Vec<LevelReport>,
}

impl PyramidReport {
    pub fn level(&self, level: u8) -> Option<&LevelReport> {
        self.levels.iter().find(|r| r.level == level)
    }

    /// Job counts across all levels.
    pub fn jobs(&self) -> BatchSummary {
        let mut total = BatchSummary::new("pyramid");
        for level in &self.levels {
            total.merge(&level.jobs);
        }
        total
    }

    pub fn tiles_kept(&self) -> usize {
        self.levels.iter().map(|l| l.kept).sum()
    }
}

fn level_label(level: u8) -> String {
    format!("level {}", level)
}

/// Builds one layer's pyramid into an output root.
pub struct PyramidBuilder<'a, G, E, R> {
    grid: &'a G,
    orchestrator: &'a Orchestrator<R>,
    pruner: EmptyTilePruner<&'a E>,
    config: PyramidConfig,
    source: TileSource,
    output_root: PathBuf,
    region: Region,
    levels: LevelRange,
    exclusions: ExclusionSet,
    grids: BTreeMap<u8, CoveringGrid>,
}

impl<'a, G, E, R> PyramidBuilder<'a, G, E, R>
where
    G: GridSystem,
    E: RasterEngine,
    R: CommandRunner,
{
    pub fn new(
        grid: &'a G,
        engine: &'a E,
        orchestrator: &'a Orchestrator<R>,
        source: TileSource,
        output_root: impl Into<PathBuf>,
        region: Region,
        levels: LevelRange,
    ) -> Self {
        Self {
            grid,
            orchestrator,
            pruner: EmptyTilePruner::new(engine),
            config: PyramidConfig::default(),
            source,
            output_root: output_root.into(),
            region,
            levels,
            exclusions: ExclusionSet::default(),
            grids: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, config: PyramidConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Covering grid of `level`, computed once per builder.
    pub fn covering_grid(&mut self, level: u8) -> Result<&CoveringGrid, PyramidError> {
        if !self.grids.contains_key(&level) {
            let grid = self.grid.covering_grid(level, &self.region)?;
            debug!(level, cells = grid.len(), "Computed covering grid");
            self.grids.insert(level, grid);
        }
        Ok(&self.grids[&level])
    }

    fn tile_path(&self, cell: &Cell) -> PathBuf {
        tile_path(&self.output_root, &cell.address, self.config.format.extension())
    }

    /// Decides, per covering cell, whether and how it is built.
    ///
    /// Coarser levels look at the filesystem, so a plan is only
    /// meaningful once the level below has been built and pruned.
    pub async fn plan_level(&mut self, level: u8) -> Result<Vec<PlannedTile>, PyramidError> {
        self.covering_grid(level)?;
        let grid = &self.grids[&level];
        let finest = level == self.levels.max();
        let mut plan = Vec::with_capacity(grid.len());

        for cell in grid.cells() {
            let path = self.tile_path(cell);
            let action = if finest {
                if self.exclusions.contains(&cell.address) {
                    TileAction::Excluded
                } else {
                    TileAction::Warp(self.source_warp(cell, &path))
                }
            } else {
                let children = self.existing_children(cell).await?;
                if children.is_empty() {
                    TileAction::NoChildren
                } else {
                    TileAction::Warp(self.children_warp(cell, &path, children))
                }
            };
            plan.push(PlannedTile {
                cell: cell.clone(),
                path,
                action,
            });
        }
        Ok(plan)
    }

    async fn existing_children(&self, cell: &Cell) -> Result<Vec<PathBuf>, PyramidError> {
        let mut existing = Vec::new();
        for child in self.grid.children(cell)? {
            let path = self.tile_path(&child);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                existing.push(path);
            }
        }
        Ok(existing)
    }

    fn source_warp(&self, cell: &Cell, output: &Path) -> WarpRequest {
        let description = &self.source.description;
        WarpRequest {
            sources: vec![self.source.path.clone()],
            output: output.to_path_buf(),
            source_srs: description.srs.clone(),
            target_srs: self.grid.srs(),
            bounds: cell.bounds,
            size: self.config.tile_size,
            resampling: self.config.resampling,
            format: self.config.format,
            block_size: self.config.block_size,
            nodata: description.nodata.unwrap_or(self.config.default_nodata),
        }
    }

    fn children_warp(&self, cell: &Cell, output: &Path, children: Vec<PathBuf>) -> WarpRequest {
        let srs = self.grid.srs();
        WarpRequest {
            sources: children,
            output: output.to_path_buf(),
            source_srs: srs.clone(),
            target_srs: srs,
            bounds: cell.bounds,
            size: self.config.tile_size,
            resampling: self.config.resampling,
            format: self.config.format,
            block_size: self.config.block_size,
            nodata: self
                .source
                .description
                .nodata
                .unwrap_or(self.config.default_nodata),
        }
    }

    /// Builds every level, finest first.
    ///
    /// Each level is planned, submitted, waited on and pruned before the
    /// next coarser level is planned.
    pub async fn build(&mut self) -> Result<PyramidReport, PyramidError> {
        info!(
            source = %self.source.path.display(),
            output = %self.output_root.display(),
            min_level = self.levels.min(),
            max_level = self.levels.max(),
            region = %self.region,
            "Building pyramid"
        );

        let mut report = PyramidReport::default();
        for level in self.levels.descending() {
            let level_report = self.build_level(level).await?;
            info!("{}", level_report);
            report.levels.push(level_report);
        }

        let jobs = report.jobs();
        info!(tiles = report.tiles_kept(), jobs = %jobs, "Pyramid complete");
        Ok(report)
    }

    async fn build_level(&mut self, level: u8) -> Result<LevelReport, PyramidError> {
        let plan = self.plan_level(level).await?;
        let mut report = LevelReport::new(level, plan.len());
        let mut batch = JobBatch::new(level_label(level));
        let mut built = Vec::new();

        for tile in plan {
            let request = match tile.action {
                TileAction::Excluded => {
                    report.skipped_excluded += 1;
                    continue;
                }
                TileAction::NoChildren => {
                    report.skipped_no_children += 1;
                    continue;
                }
                TileAction::Warp(request) => request,
            };

            if let Some(parent) = tile.path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(PyramidError::io(parent))?;
            }
            debug!(cell = %tile.cell.address, path = %tile.path.display(), "Submitting tile");
            batch.push(self.orchestrator.submit(request.to_command()).await?);
            report.submitted += 1;
            built.push(tile.path);
        }

        report.jobs = self.orchestrator.barrier(batch).await;

        for path in &built {
            match self.pruner.prune(path).await? {
                PruneOutcome::Kept => report.kept += 1,
                PruneOutcome::Removed => report.pruned += 1,
                PruneOutcome::Missing => {}
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::CellAddress;
    use crate::grid::{Bounds, NestedGrid};
    use crate::jobs::Backend;
    use crate::process::{ProcessCommand, ProcessError, ProcessOutput};
    use crate::raster::{BandStatistics, RasterError, RasterFormat, RasterInfo};
    use crate::srs::{SpatialReference, SrsOrigin};
    use tempfile::TempDir;

    struct NoopRunner;

    impl CommandRunner for NoopRunner {
        async fn run(&self, _command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
            Ok(ProcessOutput::ok(""))
        }
    }

    struct NoopEngine;

    impl RasterEngine for NoopEngine {
        async fn raster_info(&self, path: &Path) -> Result<RasterInfo, RasterError> {
            Err(RasterError::Incomplete {
                tool: "test",
                path: path.to_path_buf(),
                reason: "unused".into(),
            })
        }

        async fn compute_statistics(&self, _path: &Path) -> Result<Vec<BandStatistics>, RasterError> {
            Ok(vec![BandStatistics {
                mean: Some(1.0),
                ..Default::default()
            }])
        }

        async fn vector_extent(&self, _path: &Path) -> Result<Bounds, RasterError> {
            unreachable!()
        }

        async fn to_geographic(
            &self,
            _points: &[(f64, f64)],
            _from: &SpatialReference,
        ) -> Result<Vec<(f64, f64)>, RasterError> {
            unreachable!()
        }

        async fn stack_bands(
            &self,
            _inputs: &[PathBuf],
            _output: &Path,
            _format: RasterFormat,
            _block_size: u32,
        ) -> Result<(), RasterError> {
            unreachable!()
        }

        async fn set_band_descriptions(
            &self,
            _path: &Path,
            _descriptions: &[String],
        ) -> Result<(), RasterError> {
            unreachable!()
        }
    }

    fn source(nodata: Option<f64>) -> TileSource {
        TileSource {
            path: PathBuf::from("/data/scene.tif"),
            description: SourceDescription {
                srs: SpatialReference::Epsg(2193),
                srs_origin: SrsOrigin::Authority,
                nodata,
                band_count: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_finest_plan_uses_source_and_exclusions() {
        let dir = TempDir::new().unwrap();
        let grid = NestedGrid::new();
        let orchestrator = Orchestrator::new(NoopRunner, Backend::Local);
        let excluded: CellAddress = "N0".parse().unwrap();
        let mut builder = PyramidBuilder::new(
            &grid,
            &NoopEngine,
            &orchestrator,
            source(None),
            dir.path(),
            Region::global(),
            LevelRange::new(0, 1).unwrap(),
        )
        .with_exclusions([excluded.clone()].into_iter().collect());

        let plan = builder.plan_level(1).await.unwrap();
        assert_eq!(plan.len(), 54);

        let skipped: Vec<_> = plan.iter().filter(|t| t.request().is_none()).collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].cell.address, excluded);
        assert_eq!(skipped[0].action, TileAction::Excluded);

        let warp = plan.iter().find_map(PlannedTile::request).unwrap();
        assert_eq!(warp.sources, vec![PathBuf::from("/data/scene.tif")]);
        assert_eq!(warp.source_srs, SpatialReference::Epsg(2193));
        assert_eq!(warp.target_srs, SpatialReference::wgs84());
        assert_eq!(warp.nodata, 255.0);
        assert_eq!(warp.size, 729);
    }

    #[tokio::test]
    async fn test_coarse_plan_reads_existing_children() {
        let dir = TempDir::new().unwrap();
        let grid = NestedGrid::new();
        let orchestrator = Orchestrator::new(NoopRunner, Backend::Local);
        let mut builder = PyramidBuilder::new(
            &grid,
            &NoopEngine,
            &orchestrator,
            source(Some(0.0)),
            dir.path(),
            Region::global(),
            LevelRange::new(0, 1).unwrap(),
        );

        std::fs::create_dir_all(dir.path().join("R")).unwrap();
        std::fs::write(dir.path().join("R/4.kea"), b"").unwrap();
        std::fs::write(dir.path().join("R/2.kea"), b"").unwrap();

        let plan = builder.plan_level(0).await.unwrap();
        assert_eq!(plan.len(), 6);
        for tile in &plan {
            if tile.cell.address.as_str() == "R" {
                let warp = tile.request().unwrap();
                assert_eq!(
                    warp.sources,
                    vec![dir.path().join("R/2.kea"), dir.path().join("R/4.kea")]
                );
                assert_eq!(warp.source_srs, warp.target_srs);
                assert_eq!(warp.nodata, 0.0);
                assert_eq!(tile.path, dir.path().join("R.kea"));
            } else {
                assert_eq!(tile.action, TileAction::NoChildren);
            }
        }
    }

    #[tokio::test]
    async fn test_covering_grid_is_memoized() {
        let dir = TempDir::new().unwrap();
        let grid = NestedGrid::new();
        let orchestrator = Orchestrator::new(NoopRunner, Backend::Local);
        let mut builder = PyramidBuilder::new(
            &grid,
            &NoopEngine,
            &orchestrator,
            source(None),
            dir.path(),
            Region::global(),
            LevelRange::new(0, 0).unwrap(),
        );
        let first = builder.covering_grid(0).unwrap().clone();
        assert_eq!(builder.covering_grid(0).unwrap(), &first);
        assert_eq!(builder.grids.len(), 1);
    }
}
