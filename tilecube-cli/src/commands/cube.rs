//! Cube command - tile several layers, then stack them into a cube.

use clap::Args;
use std::path::PathBuf;
use tilecube::cube::{CubePipeline, LayerSource};
use tilecube::grid::NestedGrid;

use super::common::{
    current_program, gdal_tools, level_range, orchestrator, print_summaries, resolve_region,
    Parallelism,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the cube command.
#[derive(Debug, Args)]
pub struct CubeArgs {
    /// Directory receiving one pyramid per layer
    pub tiles: PathBuf,

    /// Cube output root; removed and recreated if it exists
    pub cube: PathBuf,

    /// Coarsest level
    pub min_level: u8,

    /// Finest level
    pub max_level: u8,

    /// Continuous layer source, resampled with the configured method
    #[arg(long = "layer", value_name = "PATH")]
    pub layers: Vec<PathBuf>,

    /// Categorical layer source (masks, classes), resampled with nearest
    #[arg(long = "mask-layer", value_name = "PATH")]
    pub mask_layers: Vec<PathBuf>,

    /// Continuous layer and its mask; both are skipped if either is missing
    #[arg(long = "masked-layer", num_args = 2, value_names = ["DATA", "MASK"])]
    pub masked_layers: Vec<PathBuf>,

    /// Vector file whose bounding box is the target extent
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// File listing finest-level cells to skip, one per line
    #[arg(long)]
    pub exclude: Option<PathBuf>,

    /// Where tiling and stacking jobs run
    #[arg(long, value_enum, default_value_t = Parallelism::None)]
    pub parallelism: Parallelism,

    /// Log at debug level, here and in every job
    #[arg(short, long)]
    pub verbose: bool,
}

impl CubeArgs {
    /// Continuous layers, then masked pairs, then categorical layers, each
    /// in given order.
    fn sources(&self) -> Vec<LayerSource> {
        let pairs = self
            .masked_layers
            .chunks_exact(2)
            .map(|pair| LayerSource::with_mask(&pair[0], &pair[1]));
        self.layers
            .iter()
            .map(|p| LayerSource::new(p, false))
            .chain(pairs)
            .chain(self.mask_layers.iter().map(|p| LayerSource::new(p, true)))
            .collect()
    }
}

/// Run the cube command.
pub fn run(args: CubeArgs) -> Result<(), CliError> {
    let levels = level_range(args.min_level, args.max_level)?;
    let sources = args.sources();
    if sources.is_empty() {
        return Err(CliError::Config(
            "at least one --layer, --masked-layer or --mask-layer is required".to_string(),
        ));
    }
    let runner = CliRunner::with_debug(args.verbose)?;
    runner.log_startup("cube");
    let program = current_program()?;
    let config = runner.config();

    println!("TileCube Cube Build v{}", tilecube::VERSION);
    println!("=======================");
    println!();
    for source in sources.iter().flat_map(LayerSource::tiled_sources) {
        let kind = if source.categorical { "categorical" } else { "continuous" };
        println!("Layer:      {} ({})", source.layer_name(), kind);
    }
    println!("Tiles:      {}", args.tiles.display());
    println!("Cube:       {}", args.cube.display());
    println!("Levels:     {} to {}", levels.min(), levels.max());

    runner.block_on(async {
        // Without a boundary every layer tiles its own footprint; the cube
        // spans the configured default boundary or, failing that, the globe.
        let tools = gdal_tools();
        let global = args.boundary.is_none() && config.extent.default_boundary.is_none();
        let region =
            resolve_region(&tools, global, args.boundary.clone(), None, config).await?;
        println!();

        let grid = NestedGrid::new();
        let orchestrator = orchestrator(args.parallelism, config);
        let report = CubePipeline::new(
            &grid,
            &orchestrator,
            program,
            &args.tiles,
            &args.cube,
            region,
            levels,
        )
        .with_boundary(args.boundary.clone())
        .with_exclusions(args.exclude.clone())
        .verbose(args.verbose)
        .run(&sources)
        .await?;

        for skipped in &report.skipped {
            println!("Skipped layer source: {}", skipped.display());
        }
        println!("Cube complete: {} layer(s) tiled", report.tiled.len());
        print_summaries(std::iter::once(&report.tiling).chain(&report.stacking));
        Ok::<_, CliError>(())
    })
}
