//! CLI integration tests
//!
//! These tests run the pixelrick binary against generated images and check
//! exit codes, written files and output dimensions.

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn pixelrick() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pixelrick"));
    command.env("RUST_LOG", "warn");
    command
}

fn run(args: &[&str], cwd: &Path) -> Output {
    pixelrick().args(args).current_dir(cwd).output().expect("Failed to execute pixelrick")
}

fn write_source(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([237, 28, 36, 255])
        } else {
            Rgba([64, 147, 228, 255])
        }
    });
    image.save(&path).unwrap();
    path
}

fn dimensions(path: &Path) -> (u32, u32) {
    let img = image::open(path).expect("Failed to open output image");
    (img.width(), img.height())
}

// ============================================================================
// process
// ============================================================================

#[test]
fn test_process_default_output_path() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 20, 10);

    let output = run(&["process", "photo.png"], temp.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&temp.path().join("photo_pixel.png")), (20, 10));
}

#[test]
fn test_process_size_and_preview_scale() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 40, 20);

    let output = run(
        &["process", "photo.png", "-o", "out.png", "--size", "16", "--preview-scale", "3"],
        temp.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&temp.path().join("out.png")), (48, 24));
}

#[test]
fn test_process_invalid_size_exits_2() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 20, 20);

    let output = run(&["process", "photo.png", "--size", "4"], temp.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("between 8 and 1024"));
}

#[test]
fn test_process_invalid_option_exits_2() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 20, 20);

    let output = run(&["process", "photo.png", "--jpeg-passes", "9"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_process_unsupported_input_exits_1() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("notes.txt"), "not an image").unwrap();

    let output = run(&["process", "notes.txt"], temp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported input format"));
}

#[test]
fn test_process_reads_config_defaults() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 20, 20);
    std::fs::write(
        temp.path().join("pixelrick.toml"),
        "[output]\npreview_scale = 2\nout_dir = \"pixels\"\ntarget_size = 10\n",
    )
    .unwrap();

    let output = run(&["process", "photo.png"], temp.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&temp.path().join("pixels/photo_pixel.png")), (20, 20));
}

#[test]
fn test_process_bad_config_exits_1() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 20, 20);
    std::fs::write(temp.path().join("pixelrick.toml"), "[output]\npreview_scale = 0\n").unwrap();

    let output = run(&["process", "photo.png"], temp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("output.preview_scale"));
}

// ============================================================================
// project
// ============================================================================

#[test]
fn test_project_save_info_export_reprocess() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "photo.png", 32, 16);

    let output = run(
        &["project", "save", "photo.png", "-o", "art.pxlrck", "--dither", "bayer4x4"],
        temp.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join("art.pxlrck").exists());

    let output = run(&["project", "info", "art.pxlrck", "--json"], temp.path());
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["version"], "2.0");
    assert_eq!(info["settings"]["ditheringType"], "bayer4x4");
    assert_eq!(info["metadata"]["finalDimensions"]["width"], 32);

    let output = run(&["project", "export", "art.pxlrck", "-o", "grid.png"], temp.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&temp.path().join("grid.png")), (32, 16));

    let output = run(
        &["project", "reprocess", "art.pxlrck", "-o", "again.png", "--size", "16"],
        temp.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&temp.path().join("again.png")), (16, 8));
}

#[test]
fn test_project_info_corrupt_file_exits_1() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("broken.pxlrck"), "{\"version\": ").unwrap();

    let output = run(&["project", "info", "broken.pxlrck"], temp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("corrupt project file"));
}

// ============================================================================
// palette / inspect
// ============================================================================

#[test]
fn test_palette_lists_all_colors() {
    let temp = TempDir::new().unwrap();
    let output = run(&["palette", "--json"], temp.path());
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 31);
}

#[test]
fn test_inspect_pixel_and_row() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "grid.png", 8, 2);

    let output = run(&["inspect", "grid.png", "--x", "0", "--y", "0", "--row", "1"], temp.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#6 Red"));
    assert!(stdout.contains("Row 1: 1 opaque run(s)"));
}

#[test]
fn test_inspect_selection_and_histogram() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "grid.png", 8, 2);

    let output = run(
        &["inspect", "grid.png", "--select", "0,1:7,1", "--histogram", "--json"],
        temp.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["selection"]["pixels"], 8);
    assert_eq!(report["selection"]["opaque"], 8);

    let histogram = report["histogram"].as_array().unwrap();
    assert_eq!(histogram.len(), 2);
    assert_eq!(histogram[0]["name"], "Red");
    assert_eq!(histogram[0]["count"], 8);
    assert_eq!(histogram[1]["index"], 18);
    assert_eq!(histogram[1]["count"], 8);
}

#[test]
fn test_inspect_diagonal_selection_exits_2() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "grid.png", 4, 4);
    let output = run(&["inspect", "grid.png", "--select", "0,0:3,3"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_inspect_without_query_exits_2() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "grid.png", 4, 4);
    let output = run(&["inspect", "grid.png"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_subcommand_exits_2() {
    let temp = TempDir::new().unwrap();
    let output = run(&["frobnicate"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}
