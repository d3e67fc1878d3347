//! Aspect-preserving resize and target-size validation

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{PixelrickError, Result};

/// Smallest accepted target size for the final grid.
pub const MIN_TARGET_SIZE: u32 = 8;
/// Largest accepted target size for the final grid.
pub const MAX_TARGET_SIZE: u32 = 1024;
/// Newly loaded sources larger than this are scaled down before processing.
pub const AUTO_SCALE_LIMIT: u32 = 64;

/// Dimensions after fitting the longer side of `width`x`height` to `max_dimension`.
///
/// For landscape images the width becomes `max_dimension` and the height is
/// `round(max_dimension / aspect)`. Square and portrait images fix the height
/// instead and derive the width as `round(max_dimension * aspect)`.
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let aspect = width as f64 / height as f64;
    if width > height {
        let h = (max_dimension as f64 / aspect).round() as u32;
        (max_dimension, h.max(1))
    } else {
        let w = (max_dimension as f64 * aspect).round() as u32;
        (w.max(1), max_dimension)
    }
}

/// Scale `image` so its longer side equals `max_dimension`.
///
/// Uses bilinear resampling. If the computed size equals the input size the
/// pixels are copied unchanged.
pub fn scale_to_max_dimension(image: &RgbaImage, max_dimension: u32) -> Result<RgbaImage> {
    if max_dimension == 0 {
        return Err(PixelrickError::InvalidDimension(max_dimension));
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PixelrickError::InvalidDimension(0));
    }

    let (new_width, new_height) = fit_dimensions(width, height, max_dimension);
    if (new_width, new_height) == (width, height) {
        return Ok(image.clone());
    }

    log::debug!("scale {}x{} -> {}x{}", width, height, new_width, new_height);
    Ok(imageops::resize(image, new_width, new_height, FilterType::Triangle))
}

/// Accept a target size only within `[MIN_TARGET_SIZE, MAX_TARGET_SIZE]`.
pub fn validate_target_size(size: u32) -> Result<u32> {
    if (MIN_TARGET_SIZE..=MAX_TARGET_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(PixelrickError::InvalidScaleTarget(size.to_string()))
    }
}

/// Parse a user-supplied target size string.
pub fn parse_target_size(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let size: u32 = trimmed
        .parse()
        .map_err(|_| PixelrickError::InvalidScaleTarget(trimmed.to_string()))?;
    validate_target_size(size)
}

/// Clamp a computed size into the accepted target range.
pub fn clamp_target_size(size: i64) -> u32 {
    size.clamp(MIN_TARGET_SIZE as i64, MAX_TARGET_SIZE as i64) as u32
}
