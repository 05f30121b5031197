//! Grid geometry types.

use crate::address::{AddressError, CellAddress};
use std::fmt;
use thiserror::Error;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned rectangle in a grid's native coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns true if the interiors overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Smallest rectangle enclosing all `points` (x, y).
    pub fn enclosing(points: &[(f64, f64)]) -> Option<Bounds> {
        let (first, rest) = points.split_first()?;
        let mut b = Bounds::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

/// Target region as a north-west / south-east corner pair in lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub northwest: LonLat,
    pub southeast: LonLat,
}

impl Region {
    pub const fn new(northwest: LonLat, southeast: LonLat) -> Self {
        Self {
            northwest,
            southeast,
        }
    }

    /// The whole Earth.
    pub const fn global() -> Self {
        Self::new(LonLat::new(-180.0, 90.0), LonLat::new(180.0, -90.0))
    }

    /// Region from a (west, south, east, north) rectangle.
    pub fn from_bounds(b: &Bounds) -> Self {
        Self::new(LonLat::new(b.min_x, b.max_y), LonLat::new(b.max_x, b.min_y))
    }

    pub fn west(&self) -> f64 {
        self.northwest.lon
    }

    pub fn north(&self) -> f64 {
        self.northwest.lat
    }

    pub fn east(&self) -> f64 {
        self.southeast.lon
    }

    pub fn south(&self) -> f64 {
        self.southeast.lat
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds::new(self.west(), self.south(), self.east(), self.north())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NW({:.6}, {:.6}) SE({:.6}, {:.6})",
            self.west(),
            self.north(),
            self.east(),
            self.south()
        )
    }
}

/// One grid cell: its address and its bounds in grid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub address: CellAddress,
    pub bounds: Bounds,
}

impl Cell {
    #[inline]
    pub fn level(&self) -> u8 {
        self.address.level()
    }
}

/// Cells covering a region at one level, grouped in rows.
///
/// Row order is only significant for iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoveringGrid {
    pub level: u8,
    pub rows: Vec<Vec<Cell>>,
}

impl CoveringGrid {
    pub fn new(level: u8, rows: Vec<Vec<Cell>>) -> Self {
        Self { level, rows }
    }

    /// All cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors from grid enumeration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Level {level} is outside the grid's range 0..={max}")]
    LevelOutOfRange { level: u8, max: u8 },

    #[error("Unknown face '{0}'")]
    UnknownFace(char),

    #[error("Selector '{selector}' is invalid for address '{address}'")]
    InvalidSelector { address: String, selector: char },

    #[error("Invalid region {0}: north must be above south and east right of west")]
    InvalidRegion(String),

    #[error(transparent)]
    Address(#[from] AddressError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_touching_edges() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 20.0, 10.0);
        let c = Bounds::new(9.0, 9.0, 11.0, 11.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_enclosing_rectangle() {
        let b = Bounds::enclosing(&[(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0), (0.0, 0.0)]).unwrap();
        assert_eq!(b, Bounds::new(-2.0, -1.0, 4.0, 5.0));
        assert!(Bounds::enclosing(&[]).is_none());
    }

    #[test]
    fn test_region_bounds_roundtrip() {
        let region = Region::new(LonLat::new(166.0, -34.0), LonLat::new(179.0, -47.5));
        let b = region.to_bounds();
        assert_eq!(b, Bounds::new(166.0, -47.5, 179.0, -34.0));
        assert_eq!(Region::from_bounds(&b), region);
    }
}
