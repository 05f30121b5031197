//! Tile pyramid construction.
//!
//! Levels are built strictly from finest to coarsest. The finest level is
//! warped from the source raster; every coarser cell is resampled from
//! whichever of its children survived the level below. Each level ends
//! with a barrier on its job batch followed by an empty-tile pruning pass,
//! so the next level only ever sees tiles holding real data.
//!
//! ```text
//! for level in max..=min (descending):
//!     plan ──► submit warps ──► barrier ──► prune
//! ```

mod builder;
mod config;
mod exclusion;
mod levels;
pub mod prune;

pub use builder::{LevelReport, PlannedTile, PyramidBuilder, PyramidReport, TileAction, TileSource};
pub use config::PyramidConfig;
pub use exclusion::ExclusionSet;
pub use levels::LevelRange;
pub use prune::{EmptyTilePruner, PruneOutcome};

use crate::address::AddressError;
use crate::grid::GridError;
use crate::jobs::JobError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that stop a pyramid build.
#[derive(Debug, Error)]
pub enum PyramidError {
    #[error("Minimum level {min} is greater than maximum level {max}")]
    InvalidLevels { min: u8, max: u8 },

    #[error("Maximum level {max} is finer than the grid's deepest level {limit}")]
    LevelTooDeep { max: u8, limit: u8 },

    #[error("Failed to read exclusion list '{path}': {source}")]
    ExclusionList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cell address on line {line} of '{path}': {source}")]
    ExclusionEntry {
        path: PathBuf,
        line: usize,
        #[source]
        source: AddressError,
    },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("Filesystem error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PyramidError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Removes an existing output tree and recreates it empty.
pub async fn reset_output_root(root: &Path) -> Result<(), PyramidError> {
    if tokio::fs::try_exists(root).await.unwrap_or(false) {
        info!(root = %root.display(), "Removing existing output");
        tokio::fs::remove_dir_all(root)
            .await
            .map_err(PyramidError::io(root))?;
    }
    tokio::fs::create_dir_all(root)
        .await
        .map_err(PyramidError::io(root))
}
