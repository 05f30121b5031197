//! Warp requests.

use super::{RasterFormat, Resampling};
use crate::grid::Bounds;
use crate::process::ProcessCommand;
use crate::srs::SpatialReference;
use std::path::PathBuf;

/// Program used to execute warp requests.
pub const WARP_PROGRAM: &str = "gdalwarp";

/// Reprojects and resamples one or more sources into a single tile.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpRequest {
    /// Input rasters, warped together in order
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    pub source_srs: SpatialReference,
    pub target_srs: SpatialReference,
    /// Output extent in target coordinates
    pub bounds: Bounds,
    /// Output width and height in pixels
    pub size: u32,
    pub resampling: Resampling,
    pub format: RasterFormat,
    pub block_size: u32,
    pub nodata: f64,
}

impl WarpRequest {
    /// Builds the warp process invocation.
    pub fn to_command(&self) -> ProcessCommand {
        let size = self.size.to_string();
        let mut cmd = ProcessCommand::new(WARP_PROGRAM)
            .arg("-dstnodata")
            .arg(format_nodata(self.nodata))
            .arg("-s_srs")
            .arg(self.source_srs.to_string())
            .arg("-t_srs")
            .arg(self.target_srs.to_string())
            .arg("-te")
            .args([
                self.bounds.min_x,
                self.bounds.min_y,
                self.bounds.max_x,
                self.bounds.max_y,
            ]
            .map(|v| v.to_string()))
            .args(["-ts", size.as_str(), size.as_str()])
            .arg("-r")
            .arg(self.resampling.as_str());

        for option in self.format.creation_options(self.block_size) {
            cmd = cmd.arg("-co").arg(option);
        }
        cmd = cmd.arg("-of").arg(self.format.driver());

        for source in &self.sources {
            cmd = cmd.path_arg(source);
        }
        cmd.path_arg(&self.output)
    }
}

/// Largest magnitude below which every integral `f64` is exact as an `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Integral nodata values are written without a fraction. Anything larger
/// than an exact integer keeps its shortest round-trip form.
fn format_nodata(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        format!("{}", value as i64)
    } else {
        format!("{:e}", value)
    }
}
