//! Six-face nested 3×3 grid over geographic coordinates.
//!
//! Faces follow the rHEALPix naming: `N` is the polar cap above 45°N, `S`
//! the cap below 45°S, and `O`, `P`, `Q`, `R` split the equatorial band
//! into 90° wide quarters from the antimeridian eastwards. Every cell
//! splits into 3×3 children; selector digit `d` picks row `d / 3` (from the
//! north) and column `d % 3` (from the west).

use super::types::{Bounds, Cell, CoveringGrid, GridError, Region};
use super::GridSystem;
use crate::address::CellAddress;
use crate::srs::SpatialReference;

/// Children per side of a cell.
const N_SIDE: u64 = 3;

/// Deepest supported level (3^15 cells per face side).
const MAX_LEVEL: u8 = 15;

/// Slack used when snapping region edges to cell indices.
const EPSILON: f64 = 1e-9;

const FACES: [(char, Bounds); 6] = [
    ('N', Bounds::new(-180.0, 45.0, 180.0, 90.0)),
    ('O', Bounds::new(-180.0, -45.0, -90.0, 45.0)),
    ('P', Bounds::new(-90.0, -45.0, 0.0, 45.0)),
    ('Q', Bounds::new(0.0, -45.0, 90.0, 45.0)),
    ('R', Bounds::new(90.0, -45.0, 180.0, 45.0)),
    ('S', Bounds::new(-180.0, -90.0, 180.0, -45.0)),
];

/// Nested geographic grid with rHEALPix-style cell addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedGrid;

impl NestedGrid {
    pub fn new() -> Self {
        Self
    }

    fn face_bounds(face: char) -> Result<Bounds, GridError> {
        FACES
            .iter()
            .find(|(f, _)| *f == face)
            .map(|(_, b)| *b)
            .ok_or(GridError::UnknownFace(face))
    }

    fn check_level(level: u8) -> Result<(), GridError> {
        if level > MAX_LEVEL {
            return Err(GridError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }

    /// Bounds of the child selected by `digit` inside `parent`.
    fn child_bounds(parent: &Bounds, digit: u8) -> Bounds {
        let row = (digit as u64 / N_SIDE) as f64;
        let col = (digit as u64 % N_SIDE) as f64;
        let w = parent.width() / N_SIDE as f64;
        let h = parent.height() / N_SIDE as f64;
        let max_y = parent.max_y - row * h;
        let min_x = parent.min_x + col * w;
        Bounds::new(min_x, max_y - h, min_x + w, max_y)
    }

    /// Address of cell (`row`, `col`) at `level` below the face cell.
    fn address_for(face: &CellAddress, level: u8, row: u64, col: u64) -> CellAddress {
        (0..level as u32).rev().fold(face.clone(), |address, i| {
            let scale = N_SIDE.pow(i);
            let r = (row / scale) % N_SIDE;
            let c = (col / scale) % N_SIDE;
            address.child((r * N_SIDE + c) as u8)
        })
    }

    fn face_rows(
        face: &CellAddress,
        face_bounds: &Bounds,
        level: u8,
        target: &Bounds,
    ) -> Vec<Vec<Cell>> {
        let n = N_SIDE.pow(level as u32);
        let w = face_bounds.width() / n as f64;
        let h = face_bounds.height() / n as f64;

        let north = target.max_y.min(face_bounds.max_y);
        let south = target.min_y.max(face_bounds.min_y);
        let west = target.min_x.max(face_bounds.min_x);
        let east = target.max_x.min(face_bounds.max_x);

        let row_lo = index_floor((face_bounds.max_y - north) / h, n);
        let row_hi = index_ceil((face_bounds.max_y - south) / h, n);
        let col_lo = index_floor((west - face_bounds.min_x) / w, n);
        let col_hi = index_ceil((east - face_bounds.min_x) / w, n);

        (row_lo..row_hi)
            .map(|row| {
                (col_lo..col_hi)
                    .map(|col| {
                        let max_y = face_bounds.max_y - row as f64 * h;
                        let min_x = face_bounds.min_x + col as f64 * w;
                        Cell {
                            address: Self::address_for(face, level, row, col),
                            bounds: Bounds::new(min_x, max_y - h, min_x + w, max_y),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// First index whose cell extends past `offset` cells.
fn index_floor(offset: f64, n: u64) -> u64 {
    ((offset + EPSILON).floor().max(0.0) as u64).min(n)
}

/// One past the last index touched by `offset` cells.
fn index_ceil(offset: f64, n: u64) -> u64 {
    ((offset - EPSILON).ceil().max(0.0) as u64).min(n)
}

impl GridSystem for NestedGrid {
    fn covering_grid(&self, level: u8, region: &Region) -> Result<CoveringGrid, GridError> {
        Self::check_level(level)?;
        if region.north() <= region.south() || region.east() <= region.west() {
            return Err(GridError::InvalidRegion(region.to_string()));
        }

        let target = region.to_bounds();
        let mut rows = Vec::new();
        for (face, face_bounds) in FACES.iter().filter(|(_, b)| b.overlaps(&target)) {
            let face = CellAddress::face(*face)?;
            rows.extend(
                Self::face_rows(&face, face_bounds, level, &target)
                    .into_iter()
                    .filter(|row| !row.is_empty()),
            );
        }

        Ok(CoveringGrid::new(level, rows))
    }

    fn children(&self, cell: &Cell) -> Result<Vec<Cell>, GridError> {
        Self::check_level(cell.level() + 1)?;
        Ok((0..(N_SIDE * N_SIDE) as u8)
            .map(|d| Cell {
                address: cell.address.child(d),
                bounds: Self::child_bounds(&cell.bounds, d),
            })
            .collect())
    }

    fn cell(&self, address: &CellAddress) -> Result<Cell, GridError> {
        Self::check_level(address.level())?;
        let mut bounds = Self::face_bounds(address.face_symbol())?;
        for selector in address.selectors().chars() {
            let digit = selector
                .to_digit(10)
                .filter(|d| (*d as u64) < N_SIDE * N_SIDE)
                .ok_or_else(|| GridError::InvalidSelector {
                    address: address.to_string(),
                    selector,
                })?;
            bounds = Self::child_bounds(&bounds, digit as u8);
        }
        Ok(Cell {
            address: address.clone(),
            bounds,
        })
    }

    fn srs(&self) -> SpatialReference {
        SpatialReference::wgs84()
    }

    fn max_level(&self) -> u8 {
        MAX_LEVEL
    }
}
