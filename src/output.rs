//! PNG encoding, preview upscaling and output path generation

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Largest accepted preview upscale factor.
pub const MAX_PREVIEW_SCALE: u32 = 16;

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    let encoder = PngEncoder::new(&mut png_data);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(png_data)
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, encode_png(image)?)?;
    log::info!("wrote {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Upscale by an integer factor with nearest-neighbor sampling.
///
/// Keeps hard pixel edges. Factors of 0 or 1 return the image unchanged;
/// larger factors are capped at [`MAX_PREVIEW_SCALE`].
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let factor = factor.min(MAX_PREVIEW_SCALE);
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Output path for a processed image.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input_stem}_pixel.{ext}` next to the input |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` | `dir/{input_stem}_pixel.{ext}` |
///
/// # Arguments
///
/// * `input` - The source image path
/// * `output_arg` - The `-o` argument value, if provided
/// * `extension` - Extension of the generated file, without the dot
pub fn generate_output_path(input: &Path, output_arg: Option<&Path>, extension: &str) -> PathBuf {
    let input_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let file_name = format!("{}_pixel.{}", input_stem, extension);

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file_name)
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(file_name)
            } else {
                parent.join(file_name)
            }
        }
    }
}
