//! Spatial reference systems.
//!
//! Rasters report their reference system as WKT. The pyramid only needs an
//! authority code to hand to the warp engine, resolved once through an
//! ordered list of fallbacks (see [`SpatialReference::resolve_from_wkt`]).
//! Footprint reprojection uses the raster's complete WKT instead, since an
//! authority fallback may name a different (geographic) CRS.

mod wkt;

pub use wkt::{WktError, WktNode, WktValue};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// EPSG code of WGS84 geographic coordinates.
pub const WGS84: u32 = 4326;

/// Errors when parsing a spatial reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SrsError {
    #[error("Invalid spatial reference '{0}': expected 'EPSG:<code>' or a PROJ string")]
    Invalid(String),
}

/// A spatial reference usable as a warp source or target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpatialReference {
    /// An EPSG authority code
    Epsg(u32),
    /// A PROJ definition string (e.g. `+proj=rhealpix ...`)
    Proj(String),
    /// A complete WKT definition, as reported by the raster itself
    Wkt(String),
}

/// Which step of the precedence list produced a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrsOrigin {
    /// Top-level authority code of the WKT
    Authority,
    /// Authority code of the base geographic CRS
    GeographicBase,
    /// Nothing usable in the WKT; assumed geographic
    AssumedWgs84,
}

impl SpatialReference {
    pub const fn wgs84() -> Self {
        Self::Epsg(WGS84)
    }

    /// Returns true for geographic (longitude/latitude) references.
    ///
    /// Only WGS84 is recognised by code; PROJ strings are checked for
    /// `+proj=longlat`/`+proj=latlong` and WKT by its root keyword.
    pub fn is_geographic(&self) -> bool {
        match self {
            Self::Epsg(code) => *code == WGS84,
            Self::Proj(def) => def.contains("+proj=longlat") || def.contains("+proj=latlong"),
            Self::Wkt(wkt) => Self::wkt_is_geographic(wkt),
        }
    }

    /// Resolves a reference from a raster's WKT.
    ///
    /// Precedence, first match wins:
    /// 1. the top-level `AUTHORITY`/`ID` of the CRS,
    /// 2. the authority of its base geographic CRS,
    /// 3. `EPSG:4326`.
    ///
    /// Empty or unparsable WKT falls through to step 3.
    pub fn resolve_from_wkt(wkt: &str) -> (Self, SrsOrigin) {
        let root = match WktNode::parse(wkt) {
            Ok(root) => root,
            Err(e) => {
                if !wkt.trim().is_empty() {
                    tracing::debug!(error = %e, "Unparsable WKT, assuming geographic coordinates");
                }
                return (Self::wgs84(), SrsOrigin::AssumedWgs84);
            }
        };

        let steps: [(SrsOrigin, fn(&WktNode) -> Option<u32>); 2] = [
            (SrsOrigin::Authority, |n| n.epsg_code()),
            (SrsOrigin::GeographicBase, |n| {
                n.child_any(&["GEOGCS", "BASEGEOGCRS", "BASEGEODCRS"])
                    .and_then(WktNode::epsg_code)
            }),
        ];

        for (origin, step) in steps {
            if let Some(code) = step(&root) {
                return (Self::Epsg(code), origin);
            }
        }
        (Self::wgs84(), SrsOrigin::AssumedWgs84)
    }

    /// Whether a WKT string describes a geographic CRS.
    pub fn wkt_is_geographic(wkt: &str) -> bool {
        match WktNode::parse(wkt) {
            Ok(root) => matches!(
                root.keyword.as_str(),
                "GEOGCS" | "GEOGCRS" | "GEOGRAPHICCRS"
            ),
            // Empty WKT is treated like plain lon/lat
            Err(_) => wkt.trim().is_empty(),
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => write!(f, "EPSG:{}", code),
            Self::Proj(def) | Self::Wkt(def) => f.write_str(def),
        }
    }
}

impl FromStr for SpatialReference {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(code) = s
            .strip_prefix("EPSG:")
            .or_else(|| s.strip_prefix("epsg:"))
        {
            return code
                .parse()
                .map(Self::Epsg)
                .map_err(|_| SrsError::Invalid(s.to_string()));
        }
        if s.starts_with("+proj=") {
            return Ok(Self::Proj(s.to_string()));
        }
        Err(SrsError::Invalid(s.to_string()))
    }
}
