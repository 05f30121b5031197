//! Hierarchical cell addresses and their on-disk layout.
//!
//! A cell address is a face symbol followed by zero or more child-selector
//! digits, e.g. `N`, `O4`, `P0385`. Each selector narrows the parent cell
//! to one of its children, so the address length grows by one per
//! resolution level.

mod path;

pub use path::{relative_tile_path, tile_path, GROUP_SIZE};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when parsing a cell address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Address string was empty
    #[error("Cell address is empty")]
    Empty,

    /// First character is not an uppercase face letter
    #[error("Invalid face symbol '{0}' (expected an uppercase letter)")]
    InvalidFace(char),

    /// A selector character is not a decimal digit
    #[error("Invalid selector '{selector}' at position {position} in '{address}'")]
    InvalidSelector {
        address: String,
        selector: char,
        position: usize,
    },
}

/// Identifier of one grid cell at a given resolution level.
///
/// Ordering is lexicographic on the address string, which keeps siblings
/// adjacent and parents before their children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress(String);

impl CellAddress {
    /// Creates an address for a whole face (level 0).
    pub fn face(face: char) -> Result<Self, AddressError> {
        if !face.is_ascii_uppercase() {
            return Err(AddressError::InvalidFace(face));
        }
        Ok(Self(face.to_string()))
    }

    /// Resolution level of this cell (number of selector digits).
    #[inline]
    pub fn level(&self) -> u8 {
        (self.0.len() - 1) as u8
    }

    /// The leading face symbol.
    #[inline]
    pub fn face_symbol(&self) -> char {
        // Validated non-empty ASCII on construction
        self.0.as_bytes()[0] as char
    }

    /// Selector digits following the face symbol.
    #[inline]
    pub fn selectors(&self) -> &str {
        &self.0[1..]
    }

    /// Address of the child selected by `digit`.
    pub fn child(&self, digit: u8) -> Self {
        debug_assert!(digit < 10);
        let mut s = self.0.clone();
        s.push(char::from(b'0' + digit));
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face = chars.next().ok_or(AddressError::Empty)?;
        if !face.is_ascii_uppercase() {
            return Err(AddressError::InvalidFace(face));
        }
        for (i, c) in chars.enumerate() {
            if !c.is_ascii_digit() {
                return Err(AddressError::InvalidSelector {
                    address: s.to_string(),
                    selector: c,
                    position: i + 1,
                });
            }
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CellAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
