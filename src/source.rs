//! Source image decoding

use image::{ImageFormat, RgbaImage};
use std::path::Path;

use crate::error::{PixelrickError, Result};

/// Decode PNG or JPEG bytes into an RGBA bitmap.
///
/// The format is detected from the content, not from a file name. Anything
/// other than PNG or JPEG is rejected with `InvalidInputFormat`.
pub fn decode_source_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let format = image::guess_format(bytes)
        .map_err(|_| PixelrickError::InvalidInputFormat("unrecognized data".to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg => {}
        other => {
            return Err(PixelrickError::InvalidInputFormat(format!("{:?}", other)));
        }
    }

    let image = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(PixelrickError::InvalidDimension(0));
    }
    log::debug!("decoded {:?} source {}x{}", format, image.width(), image.height());
    Ok(image)
}

/// Read and decode a PNG or JPEG file.
pub fn decode_source_file(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path)?;
    decode_source_bytes(&bytes).map_err(|e| match e {
        PixelrickError::InvalidInputFormat(_) => {
            PixelrickError::InvalidInputFormat(path.display().to_string())
        }
        other => other,
    })
}
