//! Raster and vector collaborators.
//!
//! The pyramid never touches pixels. Everything that reads or writes raster
//! data is behind the [`RasterEngine`] trait, with [`GdalTools`] driving the
//! GDAL command-line utilities as the production implementation.
//!
//! # Architecture
//!
//! ```text
//! PyramidBuilder ──► WarpRequest ──► ProcessCommand ──► Orchestrator (job)
//!        │
//!        ├──► RasterEngine::raster_info        (nodata, footprint, SRS)
//!        └──► RasterEngine::compute_statistics (empty-tile pruning)
//!
//! CubeStacker ──► RasterEngine::stack_bands / set_band_descriptions
//! ```

mod format;
mod gdal;
mod report;
mod warp;

pub use format::{RasterFormat, Resampling};
pub use gdal::GdalTools;
pub use warp::WarpRequest;

use crate::grid::Bounds;
use crate::process::ProcessError;
use crate::srs::SpatialReference;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from raster collaborators.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The external tool could not be run
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The external tool exited unsuccessfully
    #[error("{tool} failed on '{path}' (exit code {code:?}): {stderr}")]
    ToolFailed {
        tool: &'static str,
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool's report could not be parsed
    #[error("Could not parse {tool} report for '{path}': {source}")]
    Parse {
        tool: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The report parsed but lacks required content
    #[error("{tool} report for '{path}' is incomplete: {reason}")]
    Incomplete {
        tool: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Coordinate transformation produced unusable output
    #[error("Coordinate transformation from {srs} failed: {reason}")]
    Transform { srs: SpatialReference, reason: String },
}

/// Per-band metadata of a raster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandInfo {
    pub description: String,
    pub nodata: Option<f64>,
}

/// Raster metadata needed for tiling.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    /// Width and height in pixels
    pub size: (u64, u64),
    /// GDAL affine geotransform
    pub geo_transform: [f64; 6],
    /// Reference system as WKT (empty when unknown)
    pub wkt: String,
    pub bands: Vec<BandInfo>,
}

impl RasterInfo {
    /// Corner coordinates in the raster's own reference system.
    ///
    /// Order: upper-left, lower-left, lower-right, upper-right.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let gt = &self.geo_transform;
        let (cols, rows) = (self.size.0 as f64, self.size.1 as f64);
        let at = |px: f64, py: f64| (gt[0] + px * gt[1] + py * gt[2], gt[3] + px * gt[4] + py * gt[5]);
        [at(0.0, 0.0), at(0.0, rows), at(cols, rows), at(cols, 0.0)]
    }

    /// Nodata value declared on the first band.
    pub fn nodata(&self) -> Option<f64> {
        self.bands.first().and_then(|b| b.nodata)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

/// Statistics of one band, computed over valid (non-nodata) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl BandStatistics {
    /// A band holds data unless its mean is missing or NaN.
    pub fn has_valid_data(&self) -> bool {
        self.mean.is_some_and(|m| !m.is_nan())
    }
}

/// Raster/vector operations the pyramid and cube depend on.
pub trait RasterEngine: Send + Sync {
    /// Reads size, geotransform, reference system and band metadata.
    fn raster_info(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<RasterInfo, RasterError>> + Send;

    /// Computes (and persists alongside the file) per-band statistics.
    fn compute_statistics(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Vec<BandStatistics>, RasterError>> + Send;

    /// Bounding rectangle of a vector layer, in its own coordinates.
    fn vector_extent(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Bounds, RasterError>> + Send;

    /// Transforms points from `from` to WGS84 longitude/latitude.
    fn to_geographic(
        &self,
        points: &[(f64, f64)],
        from: &SpatialReference,
    ) -> impl Future<Output = Result<Vec<(f64, f64)>, RasterError>> + Send;

    /// Concatenates all bands of `inputs`, in order, into `output`.
    fn stack_bands(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        format: RasterFormat,
        block_size: u32,
    ) -> impl Future<Output = Result<(), RasterError>> + Send;

    /// Rewrites the description of each band of `path`, in band order.
    fn set_band_descriptions(
        &self,
        path: &Path,
        descriptions: &[String],
    ) -> impl Future<Output = Result<(), RasterError>> + Send;
}

impl<E: RasterEngine> RasterEngine for &E {
    fn raster_info(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<RasterInfo, RasterError>> + Send {
        (**self).raster_info(path)
    }

    fn compute_statistics(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Vec<BandStatistics>, RasterError>> + Send {
        (**self).compute_statistics(path)
    }

    fn vector_extent(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Bounds, RasterError>> + Send {
        (**self).vector_extent(path)
    }

    fn to_geographic(
        &self,
        points: &[(f64, f64)],
        from: &SpatialReference,
    ) -> impl Future<Output = Result<Vec<(f64, f64)>, RasterError>> + Send {
        (**self).to_geographic(points, from)
    }

    fn stack_bands(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        format: RasterFormat,
        block_size: u32,
    ) -> impl Future<Output = Result<(), RasterError>> + Send {
        (**self).stack_bands(inputs, output, format, block_size)
    }

    fn set_band_descriptions(
        &self,
        path: &Path,
        descriptions: &[String],
    ) -> impl Future<Output = Result<(), RasterError>> + Send {
        (**self).set_band_descriptions(path, descriptions)
    }
}
