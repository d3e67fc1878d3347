//! Content-boundary detection and the bitmaps derived from a blurred canvas

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

/// Tight bounding box of the pixels with non-zero alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ContentBounds {
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Find the bounding box of all pixels with alpha > 0.
///
/// A fully transparent bitmap yields a 1x1 box at its center, so callers always
/// have a region to work with.
pub fn detect_bounds(image: &RgbaImage) -> ContentBounds {
    let (width, height) = image.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found {
        return ContentBounds { x: width / 2, y: height / 2, width: 1, height: 1 };
    }

    ContentBounds { x: min_x, y: min_y, width: max_x - min_x + 1, height: max_y - min_y + 1 }
}

/// The three bitmaps derived from one blurred oversized canvas.
#[derive(Debug, Clone)]
pub struct BlurVariants {
    /// The entire oversized canvas
    pub full: RgbaImage,
    /// Canvas cropped to the content bounds
    pub bound: RgbaImage,
    /// Canvas cropped back to the original frame
    pub cropped: RgbaImage,
    pub bounds: ContentBounds,
    /// Where the original frame sits inside the canvas
    pub canvas_offset: (u32, u32),
    /// Original (pre-blur) dimensions
    pub original_size: (u32, u32),
}

impl BlurVariants {
    /// Derive the full, bound and cropped bitmaps from a blurred canvas.
    ///
    /// # Arguments
    ///
    /// * `canvas` - Blurred oversized canvas
    /// * `canvas_offset` - Top-left of the original frame within `canvas`
    /// * `original_size` - Width and height of the frame before blurring
    pub fn derive(canvas: RgbaImage, canvas_offset: (u32, u32), original_size: (u32, u32)) -> Self {
        let bounds = detect_bounds(&canvas);
        let bound =
            imageops::crop_imm(&canvas, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
        let cropped = imageops::crop_imm(
            &canvas,
            canvas_offset.0,
            canvas_offset.1,
            original_size.0,
            original_size.1,
        )
        .to_image();

        log::debug!(
            "content bounds {}x{} at ({}, {}) in {}x{} canvas",
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y,
            canvas.width(),
            canvas.height()
        );

        Self { full: canvas, bound, cropped, bounds, canvas_offset, original_size }
    }

    /// Offset of the bound bitmap relative to the original frame's origin.
    ///
    /// Negative when blur spilled content above or left of the original.
    pub fn bound_offset(&self) -> (i64, i64) {
        (
            self.bounds.x as i64 - self.canvas_offset.0 as i64,
            self.bounds.y as i64 - self.canvas_offset.1 as i64,
        )
    }

    /// Longer side of the original frame.
    pub fn original_max_dimension(&self) -> u32 {
        self.original_size.0.max(self.original_size.1)
    }

    /// Longer side of the bound bitmap.
    pub fn expanded_max_dimension(&self) -> u32 {
        self.bounds.max_dimension()
    }
}
