//! Output formats and resampling methods.

use std::fmt;
use std::str::FromStr;

/// Raster file format written for tiles and cubes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    /// KEA (HDF5-based), the default tile format
    #[default]
    Kea,
    /// Tiled GeoTIFF
    GTiff,
}

impl RasterFormat {
    /// GDAL driver short name.
    pub fn driver(&self) -> &'static str {
        match self {
            Self::Kea => "KEA",
            Self::GTiff => "GTiff",
        }
    }

    /// File extension used in tile paths.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Kea => "kea",
            Self::GTiff => "tif",
        }
    }

    /// Creation options that set the internal block size.
    pub fn creation_options(&self, block_size: u32) -> Vec<String> {
        match self {
            Self::Kea => vec![format!("IMAGEBLOCKSIZE={}", block_size)],
            Self::GTiff => {
                // GeoTIFF tiles must be a multiple of 16
                let block = block_size.div_ceil(16) * 16;
                vec![
                    "TILED=YES".to_string(),
                    format!("BLOCKXSIZE={}", block),
                    format!("BLOCKYSIZE={}", block),
                ]
            }
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kea => "kea",
            Self::GTiff => "gtiff",
        })
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kea" => Ok(Self::Kea),
            "gtiff" | "geotiff" | "tif" | "tiff" => Ok(Self::GTiff),
            other => Err(format!("unknown raster format '{}'", other)),
        }
    }
}

/// Resampling method passed to the warp engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    /// Nearest neighbour; required for categorical and mask layers
    Near,
    Bilinear,
    #[default]
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Mode,
}

impl Resampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Near => "near",
            Self::Bilinear => "bilinear",
            Self::Cubic => "cubic",
            Self::CubicSpline => "cubicspline",
            Self::Lanczos => "lanczos",
            Self::Average => "average",
            Self::Mode => "mode",
        }
    }
}

impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resampling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "near" | "nearest" => Ok(Self::Near),
            "bilinear" => Ok(Self::Bilinear),
            "cubic" => Ok(Self::Cubic),
            "cubicspline" => Ok(Self::CubicSpline),
            "lanczos" => Ok(Self::Lanczos),
            "average" => Ok(Self::Average),
            "mode" => Ok(Self::Mode),
            other => Err(format!("unknown resampling method '{}'", other)),
        }
    }
}
