//! Cells that are never built.

use super::PyramidError;
use crate::address::CellAddress;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Finest-level cells to skip, e.g. open ocean.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    cells: HashSet<CellAddress>,
}

impl ExclusionSet {
    /// Reads one cell address per line; blank lines are ignored.
    pub async fn load(path: &Path) -> Result<Self, PyramidError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PyramidError::ExclusionList {
                path: path.to_path_buf(),
                source,
            })?;
        let set = Self::parse(&text).map_err(|(line, source)| PyramidError::ExclusionEntry {
            path: path.to_path_buf(),
            line,
            source,
        })?;
        info!(path = %path.display(), cells = set.len(), "Loaded exclusion list");
        Ok(set)
    }

    fn parse(text: &str) -> Result<Self, (usize, crate::address::AddressError)> {
        let mut cells = HashSet::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            cells.insert(line.parse().map_err(|e| (index + 1, e))?);
        }
        Ok(Self { cells })
    }

    pub fn contains(&self, address: &CellAddress) -> bool {
        self.cells.contains(address)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<CellAddress> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = CellAddress>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
