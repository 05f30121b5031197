//! Tile path construction from cell addresses.

use super::CellAddress;
use std::path::{Path, PathBuf};

/// Number of selector characters grouped into one directory level.
pub const GROUP_SIZE: usize = 3;

/// Relative path of the tile for `address`.
///
/// Creates a hierarchical path structure that keeps siblings together
/// and bounds directory fan-out regardless of pyramid depth:
/// ```text
/// <face>/<3 selectors>/<3 selectors>/.../<last 1-3 selectors>.<ext>
/// ```
///
/// A face-only address maps to `<face>.<ext>`.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use tilecube::address::{relative_tile_path, CellAddress};
///
/// let cell: CellAddress = "N1234567".parse().unwrap();
/// assert_eq!(
///     relative_tile_path(&cell, "kea"),
///     PathBuf::from("N/123/456/7.kea")
/// );
/// ```
pub fn relative_tile_path(address: &CellAddress, extension: &str) -> PathBuf {
    let face = address.face_symbol().to_string();
    let mut rest = address.selectors();

    if rest.is_empty() {
        return PathBuf::from(format!("{}.{}", face, extension));
    }

    let mut path = PathBuf::from(face);
    while rest.len() > GROUP_SIZE {
        let (group, tail) = rest.split_at(GROUP_SIZE);
        path.push(group);
        rest = tail;
    }
    path.push(format!("{}.{}", rest, extension));
    path
}

/// Full path of the tile for `address` below `root`.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use tilecube::address::{tile_path, CellAddress};
///
/// let cell: CellAddress = "O42".parse().unwrap();
/// assert_eq!(
///     tile_path(Path::new("/data/ndvi"), &cell, "kea"),
///     PathBuf::from("/data/ndvi/O/42.kea")
/// );
/// ```
pub fn tile_path(root: &Path, address: &CellAddress, extension: &str) -> PathBuf {
    root.join(relative_tile_path(address, extension))
}
