//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a strictly positive integer.
fn positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tiling] section
    if let Some(section) = ini.section(Some("tiling")) {
        if let Some(v) = section.get("tile_size") {
            config.tiling.tile_size = positive("tiling", "tile_size", v)?;
        }
        if let Some(v) = section.get("block_size") {
            config.tiling.block_size = positive("tiling", "block_size", v)?;
        }
        if let Some(v) = section.get("resampling") {
            config.tiling.resampling = v.trim().parse().map_err(|_| {
                invalid(
                    "tiling",
                    "resampling",
                    v,
                    "must be one of: near, bilinear, cubic, cubicspline, lanczos, average, mode",
                )
            })?;
        }
        if let Some(v) = section.get("format") {
            config.tiling.format = v
                .trim()
                .parse()
                .map_err(|_| invalid("tiling", "format", v, "must be 'kea' or 'gtiff'"))?;
        }
        if let Some(v) = section.get("default_nodata") {
            config.tiling.default_nodata = v
                .trim()
                .parse()
                .map_err(|_| invalid("tiling", "default_nodata", v, "must be a number"))?;
        }
    }
    if config.tiling.block_size > config.tiling.tile_size {
        return Err(invalid(
            "tiling",
            "block_size",
            &config.tiling.block_size.to_string(),
            "must not exceed tile_size",
        ));
    }

    // [extent] section
    if let Some(section) = ini.section(Some("extent")) {
        if let Some(v) = section.get("default_boundary") {
            let v = v.trim();
            config.extent.default_boundary = (!v.is_empty()).then(|| expand_tilde(v));
        }
    }

    // [cluster] section
    if let Some(section) = ini.section(Some("cluster")) {
        if let Some(v) = section.get("job_template") {
            config.cluster.job_template = non_empty_path("cluster", "job_template", v)?;
        }
        if let Some(v) = section.get("job_file") {
            config.cluster.job_file = non_empty_path("cluster", "job_file", v)?;
        }
        if let Some(v) = section.get("submit_program") {
            config.cluster.submit_program = non_empty("cluster", "submit_program", v)?;
        }
        if let Some(v) = section.get("status_program") {
            config.cluster.status_program = non_empty("cluster", "status_program", v)?;
        }
        if let Some(v) = section.get("poll_interval_secs") {
            config.cluster.poll_interval_secs = positive("cluster", "poll_interval_secs", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            config.logging.file = non_empty_path("logging", "file", v)?;
        }
    }

    Ok(config)
}

fn non_empty(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(section, key, value, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_empty_path(section: &str, key: &str, value: &str) -> Result<PathBuf, ConfigFileError> {
    non_empty(section, key, value).map(|v| expand_tilde(&v))
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
