//! [`RasterEngine`] backed by the GDAL command-line utilities.

use super::report::{GdalInfoReport, OgrInfoReport};
use super::{BandStatistics, RasterEngine, RasterError, RasterFormat, RasterInfo};
use crate::grid::Bounds;
use crate::process::{CommandRunner, ProcessCommand, ProcessOutput};
use crate::srs::SpatialReference;
use std::path::{Path, PathBuf};
use tracing::debug;

const GDALINFO: &str = "gdalinfo";
const OGRINFO: &str = "ogrinfo";
const GDALTRANSFORM: &str = "gdaltransform";
const GDAL_MERGE: &str = "gdal_merge.py";
const PYTHON: &str = "python3";

/// Sets band descriptions through the GDAL Python bindings, which
/// `gdal_merge.py` already requires. Arguments: path, then one
/// description per band.
const SET_DESCRIPTIONS_SCRIPT: &str = "\
import sys
from osgeo import gdal
ds = gdal.Open(sys.argv[1], gdal.GA_Update)
if ds is None:
    sys.exit(1)
for i, d in enumerate(sys.argv[2:], start=1):
    if i > ds.RasterCount:
        break
    ds.GetRasterBand(i).SetDescription(d)
ds = None
";

/// Runs GDAL utilities through a [`CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct GdalTools<R> {
    runner: R,
}

impl<R: CommandRunner> GdalTools<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs a tool and fails on a non-zero exit.
    async fn run_tool(
        &self,
        tool: &'static str,
        path: &Path,
        command: ProcessCommand,
    ) -> Result<ProcessOutput, RasterError> {
        debug!(command = %command, "Running GDAL tool");
        let output = self.runner.run(&command).await?;
        if !output.success() {
            return Err(RasterError::ToolFailed {
                tool,
                path: path.to_path_buf(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    async fn gdalinfo(&self, path: &Path, stats: bool) -> Result<GdalInfoReport, RasterError> {
        let mut command = ProcessCommand::new(GDALINFO).arg("-json");
        if stats {
            command = command.arg("-stats");
        }
        let output = self.run_tool(GDALINFO, path, command.path_arg(path)).await?;
        serde_json::from_str(&output.stdout).map_err(|source| RasterError::Parse {
            tool: GDALINFO,
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<R: CommandRunner> RasterEngine for GdalTools<R> {
    async fn raster_info(&self, path: &Path) -> Result<RasterInfo, RasterError> {
        self.gdalinfo(path, false)
            .await?
            .into_info()
            .map_err(|reason| RasterError::Incomplete {
                tool: GDALINFO,
                path: path.to_path_buf(),
                reason,
            })
    }

    async fn compute_statistics(&self, path: &Path) -> Result<Vec<BandStatistics>, RasterError> {
        Ok(self.gdalinfo(path, true).await?.statistics())
    }

    async fn vector_extent(&self, path: &Path) -> Result<Bounds, RasterError> {
        let command = ProcessCommand::new(OGRINFO)
            .args(["-json", "-ro", "-so", "-al"])
            .path_arg(path);
        let output = self.run_tool(OGRINFO, path, command).await?;
        let report: OgrInfoReport =
            serde_json::from_str(&output.stdout).map_err(|source| RasterError::Parse {
                tool: OGRINFO,
                path: path.to_path_buf(),
                source,
            })?;
        report.extent().ok_or_else(|| RasterError::Incomplete {
            tool: OGRINFO,
            path: path.to_path_buf(),
            reason: "no layer with a geometry extent".to_string(),
        })
    }

    async fn to_geographic(
        &self,
        points: &[(f64, f64)],
        from: &SpatialReference,
    ) -> Result<Vec<(f64, f64)>, RasterError> {
        let input: String = points.iter().map(|(x, y)| format!("{} {}\n", x, y)).collect();
        let command = ProcessCommand::new(GDALTRANSFORM)
            .arg("-s_srs")
            .arg(from.to_string())
            .arg("-t_srs")
            .arg(SpatialReference::wgs84().to_string())
            .stdin(input);
        let output = self.run_tool(GDALTRANSFORM, Path::new(""), command).await?;

        let transformed = parse_transform_output(&output.stdout).map_err(|reason| {
            RasterError::Transform {
                srs: from.clone(),
                reason,
            }
        })?;
        if transformed.len() != points.len() {
            return Err(RasterError::Transform {
                srs: from.clone(),
                reason: format!("expected {} points, got {}", points.len(), transformed.len()),
            });
        }
        Ok(transformed)
    }

    async fn stack_bands(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        format: RasterFormat,
        block_size: u32,
    ) -> Result<(), RasterError> {
        let mut command = ProcessCommand::new(GDAL_MERGE)
            .arg("-separate")
            .arg("-of")
            .arg(format.driver());
        for option in format.creation_options(block_size) {
            command = command.arg("-co").arg(option);
        }
        command = command.arg("-o").path_arg(output);
        for input in inputs {
            command = command.path_arg(input);
        }
        self.run_tool(GDAL_MERGE, output, command).await?;
        Ok(())
    }

    async fn set_band_descriptions(
        &self,
        path: &Path,
        descriptions: &[String],
    ) -> Result<(), RasterError> {
        let command = ProcessCommand::new(PYTHON)
            .arg("-c")
            .arg(SET_DESCRIPTIONS_SCRIPT)
            .path_arg(path)
            .args(descriptions.iter().cloned());
        self.run_tool(PYTHON, path, command).await?;
        Ok(())
    }
}

/// Parses `x y [z]` lines written by `gdaltransform`.
fn parse_transform_output(stdout: &str) -> Result<Vec<(f64, f64)>, String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.split_whitespace().map(str::parse::<f64>);
            match (parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(y))) => Ok((x, y)),
                _ => Err(format!("unreadable output line '{}'", line)),
            }
        })
        .collect()
}
