//! WASM API module for browser/JS interop
//!
//! Runs the pipeline on raw RGBA pixels handed over from a canvas and exposes
//! the palette for UI swatches.

use image::RgbaImage;
use wasm_bindgen::prelude::*;

use crate::error::{PixelrickError, Result};
use crate::options::ProcessingOptions;
use crate::output::encode_png;
use crate::palette;
use crate::pipeline::Pipeline;
use crate::project::Project;
use crate::scale::{validate_target_size, AUTO_SCALE_LIMIT};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Result of processing an image into a grid.
#[wasm_bindgen]
pub struct ProcessResult {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    error: Option<String>,
}

#[wasm_bindgen]
impl ProcessResult {
    /// Width of the grid in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data (4 bytes per pixel)
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Error message when processing failed
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

impl ProcessResult {
    fn failed(error: PixelrickError) -> Self {
        Self { width: 0, height: 0, pixels: Vec::new(), error: Some(error.to_string()) }
    }
}

fn parse_options(options_json: &str) -> Result<ProcessingOptions> {
    if options_json.trim().is_empty() {
        return Ok(ProcessingOptions::default());
    }
    serde_json::from_str(options_json)
        .map_err(|e| PixelrickError::InvalidOptions(vec![e.to_string()]))
}

fn run(pixels: &[u8], width: u32, height: u32, options_json: &str, target_size: u32) -> Result<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || pixels.len() != expected {
        return Err(PixelrickError::InvalidInputFormat(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }
    let image = RgbaImage::from_raw(width, height, pixels.to_vec())
        .ok_or_else(|| PixelrickError::InvalidInputFormat("pixel buffer too small".into()))?;

    let options = parse_options(options_json)?;
    let size = if target_size == 0 {
        width.max(height).min(AUTO_SCALE_LIMIT)
    } else {
        validate_target_size(target_size)?
    };

    let mut pipeline = Pipeline::default();
    pipeline.restore(image, options, size, size)?;
    let grid = pipeline.grid().ok_or(PixelrickError::NoSource)?;
    Ok(grid.as_image().clone())
}

/// Convert canvas pixels into a pixel-art grid.
///
/// # Arguments
/// * `pixels` - RGBA bytes, row-major, `width * height * 4` long
/// * `options_json` - Processing options as JSON (camelCase keys); empty for defaults
/// * `target_size` - Longer side of the grid; 0 picks the source size capped at 64
#[wasm_bindgen]
pub fn process_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    options_json: &str,
    target_size: u32,
) -> ProcessResult {
    match run(pixels, width, height, options_json, target_size) {
        Ok(grid) => ProcessResult {
            width: grid.width(),
            height: grid.height(),
            pixels: grid.into_raw(),
            error: None,
        },
        Err(e) => ProcessResult::failed(e),
    }
}

/// Same as [`process_rgba`] but returns the grid as PNG bytes, or an empty
/// array on failure.
#[wasm_bindgen]
pub fn process_to_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    options_json: &str,
    target_size: u32,
) -> Vec<u8> {
    run(pixels, width, height, options_json, target_size)
        .and_then(|grid| encode_png(&grid))
        .unwrap_or_default()
}

/// Palette entries as a JSON array of `{index, name, rgb}` objects.
#[wasm_bindgen]
pub fn palette_json() -> String {
    serde_json::to_string(&palette::entries()).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the stored grid of a project file (legacy colors migrated).
#[wasm_bindgen]
pub fn project_grid(project_json: &str) -> ProcessResult {
    match Project::from_json(project_json).and_then(|p| p.grid()) {
        Ok(grid) => {
            let (width, height) = grid.dimensions();
            ProcessResult { width, height, pixels: grid.into_image().into_raw(), error: None }
        }
        Err(e) => ProcessResult::failed(e),
    }
}
