//! Repeated lossy re-encoding to imitate heavily recompressed images

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat, RgbImage, RgbaImage};

use crate::error::Result;

/// Lowest quality factor any pass may use.
const MIN_QUALITY: f64 = 0.1;
/// Quality lost on each pass after the first.
const QUALITY_STEP: f64 = 0.1;

/// Quality factor in `[0.1, 1.0]` for 1-indexed `pass`.
pub fn pass_quality(amount: u8, pass: u8) -> f64 {
    let baseline = (100.0 - amount.min(100) as f64) / 100.0;
    (baseline - (pass.saturating_sub(1)) as f64 * QUALITY_STEP).max(MIN_QUALITY)
}

/// Encoder quality (1..=100) for a quality factor.
pub fn encoder_quality(factor: f64) -> u8 {
    (factor * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Round-trip `image` through the JPEG codec `passes` times.
///
/// An `amount` of zero returns the input unchanged. JPEG has no alpha channel,
/// so the input's alpha is put back on the decoded pixels after the last pass.
///
/// # Arguments
///
/// * `image` - Bitmap to degrade
/// * `amount` - Compression strength 0-100
/// * `passes` - Number of encode/decode rounds, at least one
pub fn simulate_jpeg(image: &RgbaImage, amount: u8, passes: u8) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    if amount == 0 || width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let mut rgb = rgba_to_rgb(image);
    for pass in 1..=passes.max(1) {
        let quality = encoder_quality(pass_quality(amount, pass));
        log::debug!("jpeg pass {} at quality {}", pass, quality);
        rgb = jpeg_round_trip(&rgb, quality)?;
    }

    let mut output = RgbaImage::new(width, height);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let decoded = rgb.get_pixel(x, y);
        *pixel = image::Rgba([decoded[0], decoded[1], decoded[2], image.get_pixel(x, y)[3]]);
    }
    Ok(output)
}

fn jpeg_round_trip(rgb: &RgbImage, quality: u8) -> Result<RgbImage> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    let decoded = image::load_from_memory_with_format(&buffer, ImageFormat::Jpeg)?;
    Ok(decoded.to_rgb8())
}

fn rgba_to_rgb(image: &RgbaImage) -> RgbImage {
    let mut rgb = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        rgb.put_pixel(x, y, image::Rgb([pixel[0], pixel[1], pixel[2]]));
    }
    rgb
}
