//! TileCube CLI - Command-line interface
//!
//! This binary provides a command-line interface to the tilecube library:
//! tile pyramids of rasters on a nested global grid, and stacking of tiled
//! layers into multi-band cubes.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use commands::config::ConfigCommands;
use commands::cube::CubeArgs;
use commands::stack::StackArgs;
use commands::stack_tile::StackTileArgs;
use commands::tile::TileArgs;

#[derive(Parser)]
#[command(name = "tilecube")]
#[command(version = tilecube::VERSION)]
#[command(about = "Build tile pyramids and data cubes on a nested global grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tile pyramid of one raster
    Tile(TileArgs),

    /// Stack every layer below a tiles directory into a cube
    Stack(StackArgs),

    /// Stack the tiles of one cell (normally run as a job)
    StackTile(StackTileArgs),

    /// Tile several layer sources, then stack them into a cube
    Cube(CubeArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tile(args) => commands::tile::run(args),
        Commands::Stack(args) => commands::stack::run(args),
        Commands::StackTile(args) => commands::stack_tile::run(args),
        Commands::Cube(args) => commands::cube::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::common::Parallelism;
    use tilecube::raster::Resampling;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tile_arguments() {
        let cli = Cli::parse_from([
            "tilecube",
            "tile",
            "scene.tif",
            "out",
            "2",
            "5",
            "--parallelism",
            "cluster",
            "--resampling",
            "near",
            "--exclude",
            "skip.txt",
        ]);
        let Commands::Tile(args) = cli.command else {
            panic!("expected tile command");
        };
        assert_eq!((args.min_level, args.max_level), (2, 5));
        assert_eq!(args.parallelism, Parallelism::Cluster);
        assert_eq!(args.resampling, Some(Resampling::Near));
        assert!(!args.job);
    }

    #[test]
    fn test_stack_tile_is_kebab_case() {
        let cli = Cli::parse_from(["tilecube", "stack-tile", "N123", "tiles", "cube", "-v"]);
        let Commands::StackTile(args) = cli.command else {
            panic!("expected stack-tile command");
        };
        assert_eq!(args.cell, "N123");
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_levels_are_rejected() {
        assert!(Cli::try_parse_from(["tilecube", "tile", "scene.tif", "out"]).is_err());
    }
}
