//! Integration tests for the command-line interface.
//!
//! These tests run the built binary with `HOME` pointed at a temporary
//! directory, so configuration and log files never touch the real home.
//! None of them need GDAL or a cluster.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command with `home` as the home directory.
fn run_cli(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tilecube"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &std::process::Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "{} failed:\nstdout: {}\nstderr: {}",
            context, stdout, stderr
        );
    }
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["config", "path"]);
    assert_success(&output, "config path");
    assert_eq!(
        stdout(&output).trim(),
        home.path().join(".tilecube/config.ini").to_string_lossy()
    );
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["config", "init"]);
    assert_success(&output, "config init");

    let config = home.path().join(".tilecube/config.ini");
    let content = std::fs::read_to_string(&config).expect("config.ini should exist");
    assert!(content.contains("[tiling]"));
    assert!(content.contains("tile_size = 729"));

    // A second init leaves the file alone
    std::fs::write(&config, content.replace("tile_size = 729", "tile_size = 512")).unwrap();
    assert_success(&run_cli(home.path(), &["config", "init"]), "second config init");

    let output = run_cli(home.path(), &["config", "show"]);
    assert_success(&output, "config show");
    let shown = stdout(&output);
    assert!(shown.contains("tile_size = 512"));
    assert!(shown.contains("submit_program = sbatch"));
}

#[test]
fn test_invalid_config_value_is_reported() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".tilecube");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.ini"), "[tiling]\nresampling = sharpest\n").unwrap();

    let output = run_cli(home.path(), &["config", "show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("tiling.resampling"));
}

#[test]
fn test_inverted_levels_exit_with_error() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");
    let output = run_cli(
        home.path(),
        &["tile", "scene.tif", out.to_str().unwrap(), "5", "2", "--global"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("minimum level 5 is greater than maximum level 2"));
    assert!(!out.exists());
    // Rejected before logging starts, so no log file was truncated or created
    assert!(!home.path().join(".tilecube/tilecube.log").exists());
}

#[test]
fn test_levels_deeper_than_grid_are_rejected() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["stack", "tiles", "cube", "0", "40", "--global"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("deepest level"));
    assert!(!home.path().join(".tilecube/tilecube.log").exists());
}

#[test]
fn test_missing_arguments_fail_before_any_work() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["stack", "tiles"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
    // Nothing ran, so no log file was created
    assert!(!home.path().join(".tilecube/tilecube.log").exists());
}

#[test]
fn test_stack_tile_rejects_bad_cell() {
    let home = TempDir::new().unwrap();
    let tiles = home.path().join("tiles");
    std::fs::create_dir_all(&tiles).unwrap();
    let output = run_cli(
        home.path(),
        &[
            "stack-tile",
            "n12",
            tiles.to_str().unwrap(),
            home.path().join("cube").to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid cell"));
}

#[test]
fn test_stack_tile_without_layers_writes_nothing() {
    let home = TempDir::new().unwrap();
    let tiles = home.path().join("tiles");
    let cube = home.path().join("cube");
    std::fs::create_dir_all(tiles.join("empty-layer")).unwrap();

    let output = run_cli(
        home.path(),
        &["stack-tile", "N4", tiles.to_str().unwrap(), cube.to_str().unwrap()],
    );
    assert_success(&output, "stack-tile with no tiles");
    assert!(!cube.join("N/4.kea").exists());
}

#[test]
fn test_cube_requires_a_layer() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["cube", "tiles", "cube", "0", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--layer"));
}

#[test]
fn test_stack_tile_rejects_cell_outside_grid() {
    let home = TempDir::new().unwrap();
    let tiles = home.path().join("tiles");
    std::fs::create_dir_all(&tiles).unwrap();
    let output = run_cli(
        home.path(),
        &[
            "stack-tile",
            "N19",
            tiles.to_str().unwrap(),
            home.path().join("cube").to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid cell"));
}
