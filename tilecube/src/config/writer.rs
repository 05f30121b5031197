//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let default_boundary = config
        .extent
        .default_boundary
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();

    format!(
        r#"[tiling]
; Tile edge length in pixels (default: 729)
tile_size = {}
; Internal block size of written tiles (default: 243)
block_size = {}
; Resampling method: near, bilinear, cubic, cubicspline, lanczos, average, mode
; Categorical layers are always tiled with near
resampling = {}
; Output format: kea or gtiff
format = {}
; Nodata value used when the source raster declares none (default: 255)
default_nodata = {}

[extent]
; Boundary file used when neither --global, --boundary nor a source raster
; defines the extent. Must use longitude/latitude.
default_boundary = {}

[cluster]
; SLURM batch script header; each job command is appended to it
job_template = {}
; Job file written before every submission
job_file = {}
submit_program = {}
status_program = {}
; Seconds between job status queries
poll_interval_secs = {}

[logging]
file = {}
"#,
        config.tiling.tile_size,
        config.tiling.block_size,
        config.tiling.resampling,
        config.tiling.format,
        config.tiling.default_nodata,
        default_boundary,
        path_to_string(&config.cluster.job_template),
        path_to_string(&config.cluster.job_file),
        config.cluster.submit_program,
        config.cluster.status_program,
        config.cluster.poll_interval_secs,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let text = to_config_string(&ConfigFile::default());
        for section in ["[tiling]", "[extent]", "[cluster]", "[logging]"] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("tile_size = 729"));
        assert!(text.contains("resampling = cubic"));
        assert!(text.contains("default_nodata = 255"));
        assert!(text.contains("default_boundary = \n"));
    }
}
