//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show`.

use clap::Subcommand;
use tilecube::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a configuration file with default values, unless one exists
    Init,

    /// Show the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
        ConfigCommands::Show => run_show(),
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Create the default configuration file.
fn run_init() -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }
    let path = ConfigFile::ensure_exists()?;
    println!("Created {}", path.display());
    Ok(())
}

/// Print every setting, file values over defaults.
fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    if !path.exists() {
        println!("(no file at {}, showing defaults)", path.display());
    }
    println!();

    let tiling = &config.tiling;
    println!("[tiling]");
    println!("  tile_size = {}", tiling.tile_size);
    println!("  block_size = {}", tiling.block_size);
    println!("  resampling = {}", tiling.resampling);
    println!("  format = {}", tiling.format);
    println!("  default_nodata = {}", tiling.default_nodata);
    println!();

    println!("[extent]");
    match &config.extent.default_boundary {
        Some(boundary) => println!("  default_boundary = {}", boundary.display()),
        None => println!("  default_boundary = (not set)"),
    }
    println!();

    let cluster = &config.cluster;
    println!("[cluster]");
    println!("  job_template = {}", cluster.job_template.display());
    println!("  job_file = {}", cluster.job_file.display());
    println!("  submit_program = {}", cluster.submit_program);
    println!("  status_program = {}", cluster.status_program);
    println!("  poll_interval_secs = {}", cluster.poll_interval_secs);
    println!();

    println!("[logging]");
    println!("  file = {}", config.logging.file.display());

    Ok(())
}
