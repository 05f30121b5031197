//! Stack-tile command - stack every layer's tile of one cell.
//!
//! Normally started as a job by `stack` or `cube`, once per cell.

use clap::Args;
use std::path::PathBuf;
use tilecube::address::CellAddress;
use tilecube::cube::{CubeStacker, LayerCollection};
use tilecube::grid::{GridSystem, NestedGrid};
use tracing::info;

use super::common::gdal_tools;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the stack-tile command.
#[derive(Debug, Args)]
pub struct StackTileArgs {
    /// Cell address, e.g. N123
    pub cell: String,

    /// Directory holding one pyramid per layer
    pub tiles: PathBuf,

    /// Cube output root
    pub cube: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the stack-tile command.
pub fn run(args: StackTileArgs) -> Result<(), CliError> {
    let runner = CliRunner::for_job(args.verbose)?;
    let address: CellAddress = args.cell.parse()?;
    // The address must name a cell the grid actually has
    NestedGrid::new().cell(&address)?;
    let tiling = &runner.config().tiling;

    runner.block_on(async {
        let layers = LayerCollection::discover(&args.tiles).await?;
        let stacker = CubeStacker::new(gdal_tools(), tiling.format, tiling.block_size);
        match stacker.stack_cell(&address, &layers, &args.cube).await? {
            Some(outcome) => info!(
                cell = %address,
                bands = outcome.band_count(),
                "Cell stacked"
            ),
            None => info!(cell = %address, "No layer covers cell"),
        }
        Ok::<_, CliError>(())
    })
}
