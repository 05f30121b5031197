//! Target extent resolution.
//!
//! A build covers one geographic rectangle chosen from several mutually
//! exclusive sources. Precedence, first match wins:
//!
//! 1. explicit global coverage
//! 2. a vector boundary file
//! 3. the source raster's footprint
//! 4. the configured default boundary
//!
//! Any failure reading a source is fatal and never retried.

use crate::grid::{Bounds, Region};
use crate::raster::{RasterEngine, RasterError};
use crate::srs::{SpatialReference, SrsOrigin};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors resolving an extent.
#[derive(Debug, Error)]
pub enum ExtentError {
    #[error("No extent source: pass --global, a boundary file or a source raster")]
    NoSource,

    #[error("{kind} '{path}' does not exist")]
    Missing { kind: &'static str, path: PathBuf },

    #[error("Could not read boundary '{path}': {source}")]
    Boundary {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    #[error("Could not read raster '{path}': {source}")]
    Raster {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    #[error("Extent from '{path}' is degenerate: {bounds:?}")]
    Degenerate { path: PathBuf, bounds: Bounds },
}

/// Where an extent came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtentSource {
    Global,
    Boundary(PathBuf),
    RasterFootprint(PathBuf),
    DefaultBoundary(PathBuf),
}

impl fmt::Display for ExtentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Boundary(p) => write!(f, "boundary {}", p.display()),
            Self::RasterFootprint(p) => write!(f, "footprint of {}", p.display()),
            Self::DefaultBoundary(p) => write!(f, "default boundary {}", p.display()),
        }
    }
}

/// Candidate extent sources supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ExtentRequest {
    pub global: bool,
    pub boundary: Option<PathBuf>,
    pub raster: Option<PathBuf>,
    pub default_boundary: Option<PathBuf>,
}

impl ExtentRequest {
    /// The source that wins under the precedence order.
    pub fn select(&self) -> Option<ExtentSource> {
        if self.global {
            return Some(ExtentSource::Global);
        }
        if let Some(path) = &self.boundary {
            return Some(ExtentSource::Boundary(path.clone()));
        }
        if let Some(path) = &self.raster {
            return Some(ExtentSource::RasterFootprint(path.clone()));
        }
        self.default_boundary
            .clone()
            .map(ExtentSource::DefaultBoundary)
    }
}

/// A resolved extent and the source that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedExtent {
    pub region: Region,
    pub source: ExtentSource,
}

/// What the finest pyramid level needs to know about its source raster.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescription {
    pub srs: SpatialReference,
    pub srs_origin: SrsOrigin,
    /// Nodata declared on the first band, if any
    pub nodata: Option<f64>,
    pub band_count: usize,
}

/// Resolves extents and source rasters through a [`RasterEngine`].
pub struct ExtentResolver<E> {
    engine: E,
}

impl<E: RasterEngine> ExtentResolver<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Resolves the target region for `request`.
    pub async fn resolve(&self, request: &ExtentRequest) -> Result<ResolvedExtent, ExtentError> {
        let source = request.select().ok_or(ExtentError::NoSource)?;
        let region = match &source {
            ExtentSource::Global => Region::global(),
            ExtentSource::Boundary(path) | ExtentSource::DefaultBoundary(path) => {
                self.boundary_region(path).await?
            }
            ExtentSource::RasterFootprint(path) => self.footprint(path).await?,
        };
        info!(source = %source, region = %region, "Resolved target extent");
        Ok(ResolvedExtent { region, source })
    }

    /// Bounding rectangle of a vector boundary. The layer must already use
    /// longitude/latitude.
    async fn boundary_region(&self, path: &Path) -> Result<Region, ExtentError> {
        require_file("Boundary file", path).await?;
        let bounds = self
            .engine
            .vector_extent(path)
            .await
            .map_err(|source| ExtentError::Boundary {
                path: path.to_path_buf(),
                source,
            })?;
        checked_region(path, bounds)
    }

    /// Geographic footprint of a raster from its geotransform corners.
    pub async fn footprint(&self, path: &Path) -> Result<Region, ExtentError> {
        require_file("Source raster", path).await?;
        let raster_err = |source| ExtentError::Raster {
            path: path.to_path_buf(),
            source,
        };
        let info = self.engine.raster_info(path).await.map_err(raster_err)?;
        let corners = info.corners();

        let geographic = if SpatialReference::wkt_is_geographic(&info.wkt) {
            corners.to_vec()
        } else {
            let srs = SpatialReference::Wkt(info.wkt.clone());
            debug!(path = %path.display(), "Reprojecting raster corners from the raster's own CRS");
            self.engine
                .to_geographic(&corners, &srs)
                .await
                .map_err(raster_err)?
        };

        let bounds = Bounds::enclosing(&geographic).ok_or_else(|| ExtentError::Degenerate {
            path: path.to_path_buf(),
            bounds: Bounds::new(0.0, 0.0, 0.0, 0.0),
        })?;
        checked_region(path, bounds)
    }

    /// Reads the source raster's reference system and nodata value once.
    pub async fn describe_source(&self, path: &Path) -> Result<SourceDescription, ExtentError> {
        require_file("Source raster", path).await?;
        let info = self
            .engine
            .raster_info(path)
            .await
            .map_err(|source| ExtentError::Raster {
                path: path.to_path_buf(),
                source,
            })?;
        let (srs, srs_origin) = SpatialReference::resolve_from_wkt(&info.wkt);
        if srs_origin == SrsOrigin::AssumedWgs84 {
            info!(path = %path.display(), "Source raster has no usable reference system, assuming EPSG:4326");
        }
        Ok(SourceDescription {
            srs,
            srs_origin,
            nodata: info.nodata(),
            band_count: info.band_count(),
        })
    }
}

async fn require_file(kind: &'static str, path: &Path) -> Result<(), ExtentError> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        Ok(())
    } else {
        Err(ExtentError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Slack allowed past the antimeridian or the poles from reprojection
/// round-off.
const GEOGRAPHIC_SLACK: f64 = 1e-6;

/// Accepts a non-empty rectangle that lies within longitude/latitude range.
fn checked_region(path: &Path, bounds: Bounds) -> Result<Region, ExtentError> {
    let in_range = bounds.min_x >= -180.0 - GEOGRAPHIC_SLACK
        && bounds.max_x <= 180.0 + GEOGRAPHIC_SLACK
        && bounds.min_y >= -90.0 - GEOGRAPHIC_SLACK
        && bounds.max_y <= 90.0 + GEOGRAPHIC_SLACK;
    if in_range && bounds.width() > 0.0 && bounds.height() > 0.0 {
        let clamped = Bounds::new(
            bounds.min_x.max(-180.0),
            bounds.min_y.max(-90.0),
            bounds.max_x.min(180.0),
            bounds.max_y.min(90.0),
        );
        Ok(Region::from_bounds(&clamped))
    } else {
        Err(ExtentError::Degenerate {
            path: path.to_path_buf(),
            bounds,
        })
    }
}
