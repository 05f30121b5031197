//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and the async
//! runtime to reduce duplication across command handlers.

use crate::error::CliError;
use std::future::Future;
use std::path::Path;
use tilecube::config::{ConfigFile, DEFAULT_LOG_FILE_NAME};
use tilecube::logging::{init_job_logging, init_logging, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: Option<LoggingGuard>,
    /// Loaded configuration file
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a new CLI runner with optional debug logging.
    ///
    /// Logs go to the configured log file, truncated first, and to stdout.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());

        let logging_guard = init_logging(log_dir, &log_file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Self::build(config, Some(logging_guard))
    }

    /// Create a runner for a process started as a job of another
    /// `tilecube` process. Logs go to stdout only.
    pub fn for_job(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        init_job_logging(debug_mode);
        Self::build(config, None)
    }

    fn build(config: ConfigFile, logging_guard: Option<LoggingGuard>) -> Result<Self, CliError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TileCube v{}", tilecube::VERSION);
        info!("TileCube CLI: {} command", command);
    }

    /// Drive a command's future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
