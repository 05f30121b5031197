//! Per-cell band stacking.

use super::{CubeError, LayerCollection};
use crate::address::{tile_path, CellAddress};
use crate::raster::{RasterEngine, RasterFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of stacking one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub output: PathBuf,
    /// Contributing layers, in stacking order
    pub layers: Vec<String>,
    /// Band descriptions written to the output
    pub descriptions: Vec<String>,
}

impl StackOutcome {
    pub fn band_count(&self) -> usize {
        self.descriptions.len()
    }
}

/// Stacks same-address tiles of several layers into one raster.
pub struct CubeStacker<E> {
    engine: E,
    format: RasterFormat,
    block_size: u32,
}

impl<E: RasterEngine> CubeStacker<E> {
    pub fn new(engine: E, format: RasterFormat, block_size: u32) -> Self {
        Self {
            engine,
            format,
            block_size,
        }
    }

    /// Stacks the tiles at `address` of every layer that has one.
    ///
    /// Returns `None`, writing nothing, when no layer has a tile there.
    pub async fn stack_cell(
        &self,
        address: &CellAddress,
        layers: &LayerCollection,
        out_root: &Path,
    ) -> Result<Option<StackOutcome>, CubeError> {
        let extension = self.format.extension();
        let mut inputs = Vec::new();
        let mut names = Vec::new();
        for layer in layers.iter() {
            let path = tile_path(&layer.root, address, extension);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                inputs.push(path);
                names.push(layer.name.clone());
            }
        }

        if inputs.is_empty() {
            debug!(cell = %address, "No layer has a tile, nothing to stack");
            return Ok(None);
        }

        let output = tile_path(out_root, address, extension);
        prepare_output(&output).await?;
        let raster_err = |source| CubeError::Raster {
            path: output.clone(),
            source,
        };

        self.engine
            .stack_bands(&inputs, &output, self.format, self.block_size)
            .await
            .map_err(raster_err)?;

        // The bulk stack drops band metadata; rebuild it from the inputs
        let mut descriptions = Vec::new();
        for (input, name) in inputs.iter().zip(&names) {
            let info = self.engine.raster_info(input).await.map_err(raster_err)?;
            descriptions.extend(
                info.bands
                    .iter()
                    .map(|band| format!("{} {}", name, band.description)),
            );
        }
        self.engine
            .set_band_descriptions(&output, &descriptions)
            .await
            .map_err(raster_err)?;

        info!(
            cell = %address,
            layers = names.len(),
            bands = descriptions.len(),
            output = %output.display(),
            "Stacked cell"
        );
        Ok(Some(StackOutcome {
            output,
            layers: names,
            descriptions,
        }))
    }
}

async fn prepare_output(output: &Path) -> Result<(), CubeError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| CubeError::Io { path, source }
    };
    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_err(parent))?;
    }
    if tokio::fs::try_exists(output).await.unwrap_or(false) {
        tokio::fs::remove_file(output).await.map_err(io_err(output))?;
    }
    Ok(())
}
