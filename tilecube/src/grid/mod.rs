//! Discrete global grid abstraction.
//!
//! The pyramid builder never does cell geometry itself. It asks a
//! [`GridSystem`] for the cells covering a region at a level and for the
//! children of a cell, and treats [`Cell`]s as opaque address + bounds
//! pairs.

mod nested;
mod types;

pub use nested::NestedGrid;
pub use types::{Bounds, Cell, CoveringGrid, GridError, LonLat, Region};

use crate::address::CellAddress;
use crate::srs::SpatialReference;

/// A hierarchical grid that partitions the globe into cells per level.
///
/// Implementations must guarantee that addresses are unique per level and
/// that every child address extends its parent address by one selector.
pub trait GridSystem: Send + Sync {
    /// Cells at `level` intersecting `region`, as rows of cells.
    fn covering_grid(&self, level: u8, region: &Region) -> Result<CoveringGrid, GridError>;

    /// Immediate children of `cell` at `cell.level() + 1`.
    fn children(&self, cell: &Cell) -> Result<Vec<Cell>, GridError>;

    /// Resolves a single address to its cell.
    fn cell(&self, address: &CellAddress) -> Result<Cell, GridError>;

    /// Reference system that cell bounds are expressed in.
    fn srs(&self) -> SpatialReference;

    /// Finest level this grid can enumerate.
    fn max_level(&self) -> u8;
}
