//! The final quantized pixel grid

use image::{Rgba, RgbaImage};

use crate::palette;

/// Output of a pipeline run.
///
/// Every pixel is either a palette color with alpha 255 or transparent
/// (alpha 0), where transparent pixels stand for the display background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    image: RgbaImage,
}

impl PixelGrid {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Pixel at (`x`, `y`), or `None` outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// True when the pixel exists and is not transparent.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y).is_some_and(|p| p[3] > 0)
    }

    /// Palette index of the pixel's color; `None` for transparent or off-palette pixels.
    pub fn palette_index(&self, x: u32, y: u32) -> Option<usize> {
        let pixel = self.pixel(x, y)?;
        if pixel[3] == 0 {
            return None;
        }
        palette::find_index([pixel[0], pixel[1], pixel[2]])
    }

    /// Number of non-transparent pixels.
    pub fn opaque_count(&self) -> usize {
        self.image.pixels().filter(|p| p[3] > 0).count()
    }

    /// Pixel count per palette index, ignoring transparent pixels.
    pub fn palette_histogram(&self) -> [usize; palette::PALETTE_LEN] {
        let mut counts = [0usize; palette::PALETTE_LEN];
        for pixel in self.image.pixels() {
            if pixel[3] == 0 {
                continue;
            }
            if let Some(index) = palette::find_index([pixel[0], pixel[1], pixel[2]]) {
                counts[index] += 1;
            }
        }
        counts
    }

    /// Raw RGBA bytes in row-major order.
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
