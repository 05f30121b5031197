//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`tile`] - Build the tile pyramid of one raster
//! - [`stack`] - Stack tiled layers into a cube, level by level
//! - [`stack_tile`] - Stack one cell (run as a job by `stack` and `cube`)
//! - [`cube`] - Tile several layers, then stack them
//! - [`config`] - Configuration management (path, init, show)

pub mod common;
pub mod config;
pub mod cube;
pub mod stack;
pub mod stack_tile;
pub mod tile;
