//! Tile build parameters.

use crate::config::{
    DEFAULT_BLOCK_SIZE, DEFAULT_FORMAT, DEFAULT_NODATA, DEFAULT_RESAMPLING, DEFAULT_TILE_SIZE,
};
use crate::raster::{RasterFormat, Resampling};

/// Parameters passed to every warp of a pyramid build.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidConfig {
    pub tile_size: u32,
    pub block_size: u32,
    pub resampling: Resampling,
    pub format: RasterFormat,
    /// Used when the source declares no nodata value
    pub default_nodata: f64,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            resampling: DEFAULT_RESAMPLING,
            format: DEFAULT_FORMAT,
            default_nodata: DEFAULT_NODATA,
        }
    }
}
