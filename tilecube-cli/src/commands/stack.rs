//! Stack command - stack tiled layers into a cube, level by level.

use clap::Args;
use std::path::PathBuf;
use tilecube::cube::StackDriver;
use tilecube::grid::NestedGrid;
use tilecube::pyramid::reset_output_root;

use super::common::{
    current_program, gdal_tools, level_range, orchestrator, print_summaries, resolve_region,
    Parallelism,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the stack command.
#[derive(Debug, Args)]
pub struct StackArgs {
    /// Directory holding one pyramid per layer
    pub tiles: PathBuf,

    /// Cube output root; removed and recreated if it exists
    pub cube: PathBuf,

    /// Coarsest level to stack
    pub min_level: u8,

    /// Finest level to stack
    pub max_level: u8,

    /// Stack over the whole globe
    #[arg(long)]
    pub global: bool,

    /// Vector file whose bounding box is the target extent
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// Where the stacking jobs run
    #[arg(long, value_enum, default_value_t = Parallelism::None)]
    pub parallelism: Parallelism,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the stack command.
pub fn run(args: StackArgs) -> Result<(), CliError> {
    let levels = level_range(args.min_level, args.max_level)?;
    let runner = CliRunner::with_debug(args.verbose)?;
    runner.log_startup("stack");
    let program = current_program()?;
    let config = runner.config();

    println!("TileCube Stack v{}", tilecube::VERSION);
    println!("==================");
    println!();
    println!("Layers:     {}", args.tiles.display());
    println!("Cube:       {}", args.cube.display());
    println!("Levels:     {} to {}", levels.min(), levels.max());

    runner.block_on(async {
        let tools = gdal_tools();
        let region =
            resolve_region(&tools, args.global, args.boundary.clone(), None, config).await?;
        println!();

        reset_output_root(&args.cube).await?;
        let grid = NestedGrid::new();
        let orchestrator = orchestrator(args.parallelism, config);
        let summaries = StackDriver::new(
            &grid,
            &orchestrator,
            program,
            &args.tiles,
            &args.cube,
            region,
            levels,
        )
        .verbose(args.verbose)
        .run()
        .await?;

        println!("Stacking complete");
        print_summaries(&summaries);
        Ok::<_, CliError>(())
    })
}
