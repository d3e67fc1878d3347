//! Nearest-color quantization against the palette, with optional background matching
//!
//! The distance metric is a weighted Euclidean distance in RGB:
//! `sqrt(wr*dr^2 + wg*dg^2 + wb*db^2)`. When the display background takes part
//! in matching, its distance is divided by the background preference so that
//! a higher preference lets more pixels dissolve into the background.

use image::{Rgba, RgbaImage};

use crate::dither::{apply_offset, Ditherer};
use crate::options::{ProcessingOptions, RgbWeights};
use crate::palette::PALETTE;

/// Outcome of quantizing a single color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeResult {
    /// Winning color: a palette entry or the background color
    pub color: [u8; 3],
    /// Palette index of `color`, `None` for a background match
    pub palette_index: Option<usize>,
    pub is_background: bool,
}

/// Palette matcher configured from one options snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    weights: RgbWeights,
    background: Option<[u8; 3]>,
    background_preference: f64,
}

impl Quantizer {
    pub fn new(weights: RgbWeights, background: Option<[u8; 3]>, background_preference: f64) -> Self {
        Self { weights, background, background_preference }
    }

    pub fn from_options(options: &ProcessingOptions) -> Self {
        Self::new(
            options.rgb_weights,
            options.background_type.quantization_color(),
            options.background_preference,
        )
    }

    /// Weighted distance between two colors.
    pub fn distance(&self, a: [f64; 3], b: [u8; 3]) -> f64 {
        let dr = a[0] - b[0] as f64;
        let dg = a[1] - b[1] as f64;
        let db = a[2] - b[2] as f64;
        (self.weights.r * dr * dr + self.weights.g * dg * dg + self.weights.b * db * db).sqrt()
    }

    pub fn quantize(&self, rgb: [u8; 3]) -> QuantizeResult {
        self.quantize_f64(rgb.map(|c| c as f64))
    }

    /// Quantize a color whose channels may be fractional (after adjustments).
    ///
    /// Palette entries are checked in order and only a strictly smaller
    /// distance replaces the current best, so ties go to the earlier entry.
    /// The background is checked last and must also be strictly closer.
    pub fn quantize_f64(&self, rgb: [f64; 3]) -> QuantizeResult {
        let mut best_index = 0;
        let mut best_distance = self.distance(rgb, PALETTE[0]);
        for (index, color) in PALETTE.iter().enumerate().skip(1) {
            let distance = self.distance(rgb, *color);
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }

        if let Some(background) = self.background {
            if self.background_preference > 0.0 {
                let adjusted = self.distance(rgb, background) / self.background_preference;
                if adjusted < best_distance {
                    return QuantizeResult {
                        color: background,
                        palette_index: None,
                        is_background: true,
                    };
                }
            }
        }

        QuantizeResult {
            color: PALETTE[best_index],
            palette_index: Some(best_index),
            is_background: false,
        }
    }
}

/// Brightness and contrast: `(v - 128) * contrast + 128 + brightness`, clamped.
pub fn adjust_channel(value: f64, brightness: i32, contrast: f64) -> f64 {
    ((value - 128.0) * contrast + 128.0 + brightness as f64).clamp(0.0, 255.0)
}

/// Composite a partially transparent color onto `background`, rounding each channel.
pub fn blend_onto(rgb: [u8; 3], alpha: u8, background: [u8; 3]) -> [u8; 3] {
    let ratio = alpha as f64 / 255.0;
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = (rgb[c] as f64 * ratio + background[c] as f64 * (1.0 - ratio)).round() as u8;
    }
    out
}

/// Quantize every pixel of `image` to the palette.
///
/// Per pixel:
/// 1. alpha 0 passes through untouched
/// 2. partial alpha is composited onto the blend background and becomes opaque
/// 3. contrast, then brightness
/// 4. dither offset on R, G and B
/// 5. nearest palette color, or alpha 0 on a background match
///
/// The output has alpha 0 or 255 only, except for pass-through pixels.
pub fn quantize_image(image: &RgbaImage, options: &ProcessingOptions) -> RgbaImage {
    let quantizer = Quantizer::from_options(options);
    let mut ditherer = Ditherer::from_options(options);
    quantize_with(image, options, &quantizer, &mut ditherer)
}

/// Same as [`quantize_image`] with an explicit quantizer and dither state.
pub fn quantize_with(
    image: &RgbaImage,
    options: &ProcessingOptions,
    quantizer: &Quantizer,
    ditherer: &mut Ditherer,
) -> RgbaImage {
    let blend = options.background_type.blend_color();
    let mut output = RgbaImage::new(image.width(), image.height());
    let mut background_hits = 0usize;

    for (x, y, pixel) in image.enumerate_pixels() {
        let alpha = pixel[3];
        if alpha == 0 {
            output.put_pixel(x, y, *pixel);
            continue;
        }

        let mut rgb = [pixel[0], pixel[1], pixel[2]];
        if alpha < 255 {
            rgb = blend_onto(rgb, alpha, blend);
        }

        let mut adjusted =
            rgb.map(|c| adjust_channel(c as f64, options.brightness, options.contrast));
        if ditherer.is_active() {
            adjusted = apply_offset(adjusted, ditherer.offset(x, y));
        }

        let result = quantizer.quantize_f64(adjusted);
        let out = if result.is_background {
            background_hits += 1;
            let [r, g, b] = adjusted.map(|c| c.round() as u8);
            Rgba([r, g, b, 0])
        } else {
            let [r, g, b] = result.color;
            Rgba([r, g, b, 255])
        };
        output.put_pixel(x, y, out);
    }

    log::debug!(
        "quantized {}x{} ({} background matches)",
        image.width(),
        image.height(),
        background_hits
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BackgroundType, DitherType};
    use crate::palette::PALETTE_LEN;
    use proptest::prelude::*;

    fn human() -> Quantizer {
        Quantizer::new(RgbWeights::default(), None, 1.0)
    }

    #[test]
    fn test_exact_palette_colors_map_to_themselves() {
        let q = human();
        for (i, color) in PALETTE.iter().enumerate() {
            let result = q.quantize(*color);
            assert_eq!(result.color, *color);
            assert_eq!(result.palette_index, Some(i));
            assert!(!result.is_background);
        }
    }

    #[test]
    fn test_pure_red_maps_to_red() {
        let result = human().quantize([255, 0, 0]);
        assert_eq!(result.color, [237, 28, 36]);
    }

    #[test]
    fn test_background_wins_when_closer() {
        let q = Quantizer::new(RgbWeights::default(), Some([158, 189, 255]), 1.0);
        let result = q.quantize([158, 189, 255]);
        assert!(result.is_background);
        assert_eq!(result.palette_index, None);
    }

    #[test]
    fn test_zero_preference_disables_background() {
        let q = Quantizer::new(RgbWeights::default(), Some([158, 189, 255]), 0.0);
        assert!(!q.quantize([158, 189, 255]).is_background);
    }

    #[test]
    fn test_higher_preference_pulls_toward_background() {
        // A color between sky blue and the nearest palette blue
        let rgb = [130, 170, 240];
        let weak = Quantizer::new(RgbWeights::default(), Some([158, 189, 255]), 0.1);
        let strong = Quantizer::new(RgbWeights::default(), Some([158, 189, 255]), 10.0);
        assert!(!weak.quantize(rgb).is_background);
        assert!(strong.quantize(rgb).is_background);
    }

    #[test]
    fn test_adjust_channel() {
        assert_eq!(adjust_channel(128.0, 0, 2.0), 128.0);
        assert_eq!(adjust_channel(100.0, 10, 1.0), 110.0);
        assert_eq!(adjust_channel(200.0, 0, 2.0), 255.0);
        assert_eq!(adjust_channel(20.0, -50, 1.0), 0.0);
        // contrast is applied before brightness
        assert_eq!(adjust_channel(138.0, 5, 0.5), 138.0);
    }

    #[test]
    fn test_blend_onto() {
        assert_eq!(blend_onto([0, 0, 0], 255, [200, 200, 200]), [0, 0, 0]);
        assert_eq!(blend_onto([0, 0, 0], 0, [200, 100, 50]), [200, 100, 50]);
        assert_eq!(blend_onto([255, 0, 0], 51, [0, 0, 255]), [51, 0, 204]);
    }

    #[test]
    fn test_quantize_image_alpha_rules() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([12, 34, 56, 0]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let out = quantize_image(&img, &ProcessingOptions::default());
        assert_eq!(*out.get_pixel(0, 0), Rgba([12, 34, 56, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([237, 28, 36, 255]));
        assert_eq!(out.get_pixel(2, 0)[3], 255);
    }

    #[test]
    fn test_quantize_image_background_becomes_transparent() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([227, 240, 212, 255]));
        let options =
            ProcessingOptions { background_type: BackgroundType::Green, ..Default::default() };
        let out = quantize_image(&img, &options);
        for pixel in out.pixels() {
            assert_eq!(*pixel, Rgba([227, 240, 212, 0]));
        }
    }

    #[test]
    fn test_quantize_image_with_bayer_is_repeatable() {
        let mut img = RgbaImage::new(8, 8);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 30) as u8, (y * 30) as u8, 120, 255]);
        }
        let options = ProcessingOptions {
            dithering_type: DitherType::Bayer4x4,
            dithering_intensity: 80,
            ..Default::default()
        };
        assert_eq!(quantize_image(&img, &options), quantize_image(&img, &options));
    }

    proptest! {
        #[test]
        fn prop_result_is_nearest(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255,
                                  wr in 0.0f64..2.0, wg in 0.0f64..2.0, wb in 0.0f64..2.0) {
            let q = Quantizer::new(RgbWeights { r: wr, g: wg, b: wb }, None, 1.0);
            let rgb = [r, g, b];
            let result = q.quantize(rgb);
            let index = result.palette_index.unwrap();
            prop_assert!(index < PALETTE_LEN);
            prop_assert_eq!(result.color, PALETTE[index]);
            let chosen = q.distance(rgb.map(|c| c as f64), result.color);
            for color in PALETTE.iter() {
                prop_assert!(chosen <= q.distance(rgb.map(|c| c as f64), *color));
            }
        }

        #[test]
        fn prop_result_is_palette_or_background(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255,
                                                pref in 0.0f64..5.0) {
            let background = [248, 244, 240];
            let q = Quantizer::new(RgbWeights::default(), Some(background), pref);
            let result = q.quantize([r, g, b]);
            if result.is_background {
                prop_assert_eq!(result.color, background);
            } else {
                prop_assert!(PALETTE.contains(&result.color));
            }
        }
    }
}
