//! Default values for all configuration settings.

use super::file::config_directory;
use super::settings::*;
use crate::raster::{RasterFormat, Resampling};
use std::path::PathBuf;

/// Tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 729;

/// Internal block size of written tiles.
pub const DEFAULT_BLOCK_SIZE: u32 = 243;

pub const DEFAULT_RESAMPLING: Resampling = Resampling::Cubic;

pub const DEFAULT_FORMAT: RasterFormat = RasterFormat::Kea;

/// Nodata used when the source raster declares none.
pub const DEFAULT_NODATA: f64 = 255.0;

pub const DEFAULT_JOB_TEMPLATE: &str = "template.sl";
pub const DEFAULT_JOB_FILE: &str = "jobfile.sl";
pub const DEFAULT_SUBMIT_PROGRAM: &str = "sbatch";
pub const DEFAULT_STATUS_PROGRAM: &str = "squeue";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

pub const DEFAULT_LOG_FILE_NAME: &str = "tilecube.log";

/// `~/.tilecube/tilecube.log`
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for TilingSettings {
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

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            job_template: PathBuf::from(DEFAULT_JOB_TEMPLATE),
            job_file: PathBuf::from(DEFAULT_JOB_FILE),
            submit_program: DEFAULT_SUBMIT_PROGRAM.to_string(),
            status_program: DEFAULT_STATUS_PROGRAM.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            tiling: TilingSettings::default(),
            extent: ExtentSettings::default(),
            cluster: ClusterSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
