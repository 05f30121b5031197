//! Invocations of the `tilecube` binary used as job commands.
//!
//! Argument names here must match the CLI definitions.

use crate::address::CellAddress;
use crate::process::ProcessCommand;
use crate::pyramid::LevelRange;
use crate::raster::Resampling;
use std::path::{Path, PathBuf};

/// `tilecube stack-tile <cell> <tiles> <cube>`
pub fn stack_tile_command(
    program: &Path,
    cell: &CellAddress,
    tiles_root: &Path,
    cube_root: &Path,
    verbose: bool,
) -> ProcessCommand {
    let command = ProcessCommand::new(program.to_string_lossy())
        .arg("stack-tile")
        .arg(cell.as_str())
        .path_arg(tiles_root)
        .path_arg(cube_root);
    if verbose {
        command.arg("--verbose")
    } else {
        command
    }
}

/// `tilecube tile <source> <output> <min> <max> --job [options]`
///
/// `--job` keeps the child from taking over the parent's log file.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCommand {
    pub source: PathBuf,
    pub output: PathBuf,
    pub levels: LevelRange,
    pub boundary: Option<PathBuf>,
    pub exclude: Option<PathBuf>,
    /// Overrides the configured resampling method
    pub resampling: Option<Resampling>,
    pub verbose: bool,
}

impl TileCommand {
    pub fn to_command(&self, program: &Path) -> ProcessCommand {
        let mut command = ProcessCommand::new(program.to_string_lossy())
            .arg("tile")
            .path_arg(&self.source)
            .path_arg(&self.output)
            .arg(self.levels.min().to_string())
            .arg(self.levels.max().to_string())
            .arg("--job");
        if let Some(boundary) = &self.boundary {
            command = command.arg("--boundary").path_arg(boundary);
        }
        if let Some(exclude) = &self.exclude {
            command = command.arg("--exclude").path_arg(exclude);
        }
        if let Some(resampling) = self.resampling {
            command = command.arg("--resampling").arg(resampling.as_str());
        }
        if self.verbose {
            command = command.arg("--verbose");
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_tile_command() {
        let cell: CellAddress = "N123".parse().unwrap();
        let cmd = stack_tile_command(
            Path::new("/usr/bin/tilecube"),
            &cell,
            Path::new("/tiles"),
            Path::new("/cube"),
            true,
        );
        assert_eq!(cmd.program(), "/usr/bin/tilecube");
        assert_eq!(
            cmd.get_args(),
            &["stack-tile", "N123", "/tiles", "/cube", "--verbose"]
        );
    }

    #[test]
    fn test_tile_command_for_categorical_layer() {
        let tile = TileCommand {
            source: PathBuf::from("/data/cloud.kea"),
            output: PathBuf::from("/tiles/cloud"),
            levels: LevelRange::new(3, 6).unwrap(),
            boundary: Some(PathBuf::from("/aoi/nz.shp")),
            exclude: None,
            resampling: Some(Resampling::Near),
            verbose: false,
        };
        assert_eq!(
            tile.to_command(Path::new("tilecube")).get_args(),
            &[
                "tile",
                "/data/cloud.kea",
                "/tiles/cloud",
                "3",
                "6",
                "--job",
                "--boundary",
                "/aoi/nz.shp",
                "--resampling",
                "near"
            ]
        );
    }
}
