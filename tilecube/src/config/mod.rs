//! Configuration file for tilecube (`~/.tilecube/config.ini`).
//!
//! Values are layered: built-in defaults, then the config file, then
//! command-line flags (applied by the CLI).
//!
//! # Example
//!
//! ```
//! use tilecube::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.tiling.tile_size, 729);
//! let pyramid = config.tiling.to_pyramid_config();
//! assert_eq!(pyramid.block_size, 243);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ClusterSettings, ConfigFile, ExtentSettings, LoggingSettings, TilingSettings};
