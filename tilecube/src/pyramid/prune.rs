//! Empty-tile pruning.
//!
//! A freshly built tile whose every band is entirely nodata would still
//! count as a surviving child at the next coarser level. The pruner
//! computes statistics for every band (they are persisted alongside the
//! tile for later consumers) and deletes tiles with no valid pixels.

use super::PyramidError;
use crate::raster::RasterEngine;
use std::path::Path;
use tracing::{debug, warn};

/// What happened to a tile during pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// At least one band holds valid data
    Kept,
    /// Every band was empty; the file was deleted
    Removed,
    /// No file at the path (the build job produced nothing)
    Missing,
}

/// Deletes tiles without valid data.
pub struct EmptyTilePruner<E> {
    engine: E,
}

impl<E: RasterEngine> EmptyTilePruner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Checks one tile and deletes it if empty.
    ///
    /// Failing to compute statistics keeps the tile; only a failed delete
    /// is an error.
    pub async fn prune(&self, path: &Path) -> Result<PruneOutcome, PyramidError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(PruneOutcome::Missing);
        }

        let stats = match self.engine.compute_statistics(path).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not compute statistics, keeping tile");
                return Ok(PruneOutcome::Kept);
            }
        };

        if stats.iter().any(|band| band.has_valid_data()) {
            return Ok(PruneOutcome::Kept);
        }

        debug!(path = %path.display(), bands = stats.len(), "Removing empty tile");
        tokio::fs::remove_file(path)
            .await
            .map_err(PyramidError::io(path))?;
        Ok(PruneOutcome::Removed)
    }
}
