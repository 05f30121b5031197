//! Settings structs, one per `[section]` of the INI file.

use crate::jobs::ClusterConfig;
use crate::pyramid::PyramidConfig;
use crate::raster::{RasterFormat, Resampling};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub tiling: TilingSettings,
    pub extent: ExtentSettings,
    pub cluster: ClusterSettings,
    pub logging: LoggingSettings,
}

/// `[tiling]`: parameters of every warp.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingSettings {
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Internal block size of written rasters
    pub block_size: u32,
    pub resampling: Resampling,
    pub format: RasterFormat,
    /// Nodata written when the source declares none
    pub default_nodata: f64,
}

impl TilingSettings {
    pub fn to_pyramid_config(&self) -> PyramidConfig {
        PyramidConfig {
            tile_size: self.tile_size,
            block_size: self.block_size,
            resampling: self.resampling,
            format: self.format,
            default_nodata: self.default_nodata,
        }
    }
}

/// `[extent]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtentSettings {
    /// Boundary used when no other extent source is given
    pub default_boundary: Option<PathBuf>,
}

/// `[cluster]`: SLURM submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub job_template: PathBuf,
    pub job_file: PathBuf,
    pub submit_program: String,
    pub status_program: String,
    pub poll_interval_secs: u64,
}

impl ClusterSettings {
    pub fn to_cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            job_template: self.job_template.clone(),
            job_file: self.job_file.clone(),
            submit_program: self.submit_program.clone(),
            status_program: self.status_program.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}
