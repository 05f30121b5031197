//! TileCube - tile pyramids and multiband cubes on a discrete global grid
//!
//! This library builds multi-resolution tile pyramids from raster imagery,
//! finest level first, and stacks several independently tiled layers into
//! per-cell multiband cubes. Pixel work is delegated to external raster
//! tools run as jobs, locally or on a SLURM cluster.
//!
//! # High-Level API
//!
//! ```ignore
//! use tilecube::extent::{ExtentRequest, ExtentResolver};
//! use tilecube::grid::NestedGrid;
//! use tilecube::jobs::{Backend, Orchestrator};
//! use tilecube::process::SystemCommandRunner;
//! use tilecube::pyramid::{LevelRange, PyramidBuilder, TileSource};
//! use tilecube::raster::GdalTools;
//!
//! let engine = GdalTools::new(SystemCommandRunner);
//! let resolver = ExtentResolver::new(&engine);
//! let extent = resolver.resolve(&request).await?;
//! let description = resolver.describe_source(&source).await?;
//!
//! let grid = NestedGrid::new();
//! let orchestrator = Orchestrator::new(SystemCommandRunner, Backend::Local);
//! let report = PyramidBuilder::new(
//!     &grid,
//!     &engine,
//!     &orchestrator,
//!     TileSource { path: source, description },
//!     "tiles/landsat",
//!     extent.region,
//!     LevelRange::new(3, 6)?,
//! )
//! .build()
//! .await?;
//! ```

pub mod address;
pub mod config;
pub mod cube;
pub mod extent;
pub mod grid;
pub mod jobs;
pub mod logging;
pub mod process;
pub mod pyramid;
pub mod raster;
pub mod srs;

/// Version of the TileCube library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
