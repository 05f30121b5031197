//! Multiband cube assembly.
//!
//! Several layers are tiled independently into sibling directories of one
//! tiling root. A cube holds, per cell address, every layer's bands stacked
//! into a single raster, each band described as `"<layer> <description>"`.
//!
//! ```text
//! tiles/
//!   landsat/N/123/4.kea ─┐
//!   cloud/N/123/4.kea  ──┼──► cube/N/123/4.kea
//!   dem/            (none)
//! ```
//!
//! [`CubeStacker`] stacks one cell. [`StackDriver`] dispatches one
//! `stack-tile` process per covering cell, level by level, through the
//! orchestrator. [`CubePipeline`] tiles every layer first, then stacks.

mod commands;
mod driver;
mod layers;
mod pipeline;
mod stacker;

pub use commands::{stack_tile_command, TileCommand};
pub use driver::StackDriver;
pub use layers::{Layer, LayerCollection, LayerSource};
pub use pipeline::{CubePipeline, CubeReport};
pub use stacker::{CubeStacker, StackOutcome};

use crate::grid::GridError;
use crate::jobs::JobError;
use crate::pyramid::PyramidError;
use crate::raster::RasterError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from cube assembly.
#[derive(Debug, Error)]
pub enum CubeError {
    #[error("Failed to list layers in '{path}': {source}")]
    Layers {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Filesystem error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stacking into '{path}' failed: {source}")]
    Raster {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Pyramid(#[from] PyramidError),
}
