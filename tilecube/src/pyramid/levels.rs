//! Inclusive resolution level ranges.

use super::PyramidError;
use crate::grid::GridSystem;

/// Levels `min..=max`, visited finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    min: u8,
    max: u8,
}

impl LevelRange {
    pub fn new(min: u8, max: u8) -> Result<Self, PyramidError> {
        if min > max {
            return Err(PyramidError::InvalidLevels { min, max });
        }
        Ok(Self { min, max })
    }

    /// Like [`LevelRange::new`], also rejecting levels finer than `grid`
    /// can enumerate.
    pub fn for_grid<G: GridSystem>(min: u8, max: u8, grid: &G) -> Result<Self, PyramidError> {
        let range = Self::new(min, max)?;
        if max > grid.max_level() {
            return Err(PyramidError::LevelTooDeep {
                max,
                limit: grid.max_level(),
            });
        }
        Ok(range)
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    /// The finest level, built from source imagery.
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Levels from `max` down to `min`.
    pub fn descending(&self) -> impl Iterator<Item = u8> {
        (self.min..=self.max).rev()
    }

    pub fn contains(&self, level: u8) -> bool {
        (self.min..=self.max).contains(&level)
    }
}
