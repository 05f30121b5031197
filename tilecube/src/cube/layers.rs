//! Layer discovery.

use super::CubeError;
use std::path::{Path, PathBuf};

/// One tiled layer: a directory holding a pyramid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Directory name, used as the band description prefix
    pub name: String,
    pub root: PathBuf,
}

/// Layers below a tiling root, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerCollection {
    layers: Vec<Layer>,
}

impl LayerCollection {
    /// Lists the subdirectories of `tiles_root`, sorted by name.
    pub async fn discover(tiles_root: &Path) -> Result<Self, CubeError> {
        let list_err = |source| CubeError::Layers {
            path: tiles_root.to_path_buf(),
            source,
        };
        let mut entries = tokio::fs::read_dir(tiles_root).await.map_err(list_err)?;
        let mut layers = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            if !entry.file_type().await.map_err(list_err)?.is_dir() {
                continue;
            }
            layers.push(Layer {
                name: entry.file_name().to_string_lossy().into_owned(),
                root: entry.path(),
            });
        }
        Ok(Self::new(layers))
    }

    pub fn new(mut layers: Vec<Layer>) -> Self {
        layers.sort_by(|a, b| a.name.cmp(&b.name));
        Self { layers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// A source raster to tile as one cube layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub path: PathBuf,
    /// Categorical data (masks, classes) is resampled with nearest neighbour
    pub categorical: bool,
    /// Companion mask tiled as its own categorical layer. The pair is
    /// tiled together or not at all.
    pub mask: Option<PathBuf>,
}

impl LayerSource {
    pub fn new(path: impl Into<PathBuf>, categorical: bool) -> Self {
        Self {
            path: path.into(),
            categorical,
            mask: None,
        }
    }

    /// A continuous layer paired with its mask.
    pub fn with_mask(path: impl Into<PathBuf>, mask: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            categorical: false,
            mask: Some(mask.into()),
        }
    }

    /// The sources tiled for this unit: the layer, then its mask.
    pub fn tiled_sources(&self) -> Vec<LayerSource> {
        let mut sources = vec![LayerSource::new(&self.path, self.categorical)];
        if let Some(mask) = &self.mask {
            sources.push(LayerSource::new(mask, true));
        }
        sources
    }

    /// Every file this unit needs.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.path).chain(self.mask.as_ref())
    }

    /// Layer directory name: the source file name without extension.
    pub fn layer_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
