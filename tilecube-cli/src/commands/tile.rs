//! Tile command - build the tile pyramid of one raster.

use clap::Args;
use std::path::PathBuf;
use tilecube::extent::ExtentResolver;
use tilecube::grid::NestedGrid;
use tilecube::pyramid::{reset_output_root, ExclusionSet, PyramidBuilder, TileSource};
use tilecube::raster::{RasterFormat, Resampling};

use super::common::{
    gdal_tools, level_range, orchestrator, print_summaries, resolve_region, Parallelism,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Source raster
    pub source: PathBuf,

    /// Output root; removed and recreated if it exists
    pub output: PathBuf,

    /// Coarsest level to build
    pub min_level: u8,

    /// Finest level to build, warped from the source
    pub max_level: u8,

    /// Where the warp jobs run
    #[arg(long, value_enum, default_value_t = Parallelism::None)]
    pub parallelism: Parallelism,

    /// Resampling method (default from config, usually cubic)
    #[arg(long)]
    pub resampling: Option<Resampling>,

    /// Tile edge length in pixels
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Internal block size of written tiles
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Output format: kea or gtiff
    #[arg(long)]
    pub format: Option<RasterFormat>,

    /// Tile the whole globe
    #[arg(long)]
    pub global: bool,

    /// Vector file whose bounding box is the target extent
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// File listing finest-level cells to skip, one per line
    #[arg(long)]
    pub exclude: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Started by another tilecube process: log to stdout only
    #[arg(long, hide = true)]
    pub job: bool,
}

/// Run the tile command.
pub fn run(args: TileArgs) -> Result<(), CliError> {
    // Reject bad levels before logging truncates anything
    let levels = level_range(args.min_level, args.max_level)?;
    let runner = if args.job {
        CliRunner::for_job(args.verbose)?
    } else {
        CliRunner::with_debug(args.verbose)?
    };
    runner.log_startup("tile");
    let config = runner.config();

    // CLI takes precedence, then config
    let mut pyramid_config = config.tiling.to_pyramid_config();
    if let Some(resampling) = args.resampling {
        pyramid_config.resampling = resampling;
    }
    if let Some(tile_size) = args.tile_size {
        pyramid_config.tile_size = tile_size;
    }
    if let Some(block_size) = args.block_size {
        pyramid_config.block_size = block_size;
    }
    if let Some(format) = args.format {
        pyramid_config.format = format;
    }
    if pyramid_config.tile_size == 0 || pyramid_config.block_size == 0 {
        return Err(CliError::Config(
            "tile and block sizes must be positive".to_string(),
        ));
    }

    println!("TileCube Pyramid Build v{}", tilecube::VERSION);
    println!("==========================");
    println!();
    println!("Source:     {}", args.source.display());
    println!("Output:     {}", args.output.display());
    println!("Levels:     {} to {}", levels.min(), levels.max());
    println!(
        "Tiles:      {} px, {} resampling, {}",
        pyramid_config.tile_size, pyramid_config.resampling, pyramid_config.format
    );

    runner.block_on(async {
        let tools = gdal_tools();
        let region = resolve_region(
            &tools,
            args.global,
            args.boundary.clone(),
            Some(args.source.clone()),
            config,
        )
        .await?;
        let description = ExtentResolver::new(&tools)
            .describe_source(&args.source)
            .await?;
        println!(
            "Source SRS: {} ({:?}), {} band(s)",
            description.srs, description.srs_origin, description.band_count
        );

        let exclusions = match &args.exclude {
            Some(path) => ExclusionSet::load(path).await?,
            None => ExclusionSet::default(),
        };
        println!();

        reset_output_root(&args.output).await?;
        let grid = NestedGrid::new();
        let orchestrator = orchestrator(args.parallelism, config);
        let source = TileSource {
            path: args.source.clone(),
            description,
        };
        let mut builder = PyramidBuilder::new(
            &grid,
            &tools,
            &orchestrator,
            source,
            &args.output,
            region,
            levels,
        )
        .with_config(pyramid_config)
        .with_exclusions(exclusions);
        let report = builder.build().await?;

        println!("Pyramid complete: {} tile(s) kept", report.tiles_kept());
        for level in &report.levels {
            println!("  {}", level);
        }
        print_summaries([&report.jobs()]);
        Ok::<_, CliError>(())
    })
}
