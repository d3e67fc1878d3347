//! Blur effects applied before the content-boundary pass.
//!
//! All three filters average every channel, alpha included, with an
//! unweighted mean. They run on an oversized canvas (see
//! [`create_oversized_canvas`]) so that blur spilling past the original edges
//! has transparent room to land in. Rows are processed in parallel; no row
//! reads another row's output, so results match a sequential scan.

use image::{imageops, RgbaImage};
use rayon::prelude::*;
use std::f64::consts::PI;

use crate::options::ProcessingOptions;

/// Create a transparent canvas twice as wide and tall as `source`, with the
/// source drawn centered.
///
/// Returns the canvas and the offset of the source's top-left corner.
pub fn create_oversized_canvas(source: &RgbaImage) -> (RgbaImage, (u32, u32)) {
    let (width, height) = source.dimensions();
    let mut canvas = RgbaImage::new(width * 2, height * 2);
    let offset = (width / 2, height / 2);
    imageops::replace(&mut canvas, source, offset.0 as i64, offset.1 as i64);
    (canvas, offset)
}

/// Convert a blur percentage into pixels relative to the longer side of the canvas.
pub fn percent_to_pixels(percent: f64, width: u32, height: u32) -> f64 {
    (percent / 100.0) * width.max(height) as f64
}

/// Apply the configured blurs in the fixed order Gaussian, motion, rotational.
///
/// Each effect only runs when its percentage is above zero.
pub fn apply_blur_effects(image: &RgbaImage, options: &ProcessingOptions) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut result = image.clone();

    if options.gaussian_blur_percent > 0.0 {
        let radius = percent_to_pixels(options.gaussian_blur_percent, width, height);
        log::debug!("gaussian blur radius {:.2}px", radius);
        result = gaussian_blur(&result, radius);
    }

    if options.motion_blur_percent > 0.0 {
        let length = percent_to_pixels(options.motion_blur_percent, width, height);
        log::debug!("motion blur length {:.2}px", length);
        result = motion_blur(&result, length);
    }

    if options.radial_blur_percent > 0.0 {
        let radius = percent_to_pixels(options.radial_blur_percent, width, height);
        log::debug!("rotational blur radius {:.2}px", radius);
        result = rotational_blur(&result, radius);
    }

    result
}

/// Separable box blur approximating a Gaussian.
///
/// Kernel size is `ceil(2 * radius) + 1`. A horizontal pass is followed by a
/// vertical pass over its (rounded) output; samples past an edge clamp to the
/// nearest valid column or row.
pub fn gaussian_blur(image: &RgbaImage, radius: f64) -> RgbaImage {
    if radius <= 0.0 || is_empty(image) {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let kernel_size = (radius * 2.0).ceil() as i64 + 1;
    let half = kernel_size / 2;

    let src = image.as_raw();
    let horizontal = map_pixels(width, height, |x, y| {
        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for k in -half..=half {
            let px = (x as i64 + k).clamp(0, width as i64 - 1) as u32;
            accumulate(&mut sum, src, width, px, y);
            count += 1;
        }
        average(sum, count)
    });

    let src = horizontal.as_raw();
    map_pixels(width, height, |x, y| {
        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for k in -half..=half {
            let py = (y as i64 + k).clamp(0, height as i64 - 1) as u32;
            accumulate(&mut sum, src, width, x, py);
            count += 1;
        }
        average(sum, count)
    })
}

/// Horizontal motion blur over `length` pixels centered on each pixel.
///
/// `max(1, round(2 * length))` samples are spread evenly across
/// `[-length/2, +length/2]`. Samples that fall outside the image are skipped
/// and the mean covers only in-bounds samples; a pixel with no in-bounds
/// sample keeps its original value.
pub fn motion_blur(image: &RgbaImage, length: f64) -> RgbaImage {
    if length <= 0.0 || is_empty(image) {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let samples = ((length * 2.0).round() as i64).max(1);
    let half_length = length / 2.0;
    let step_divisor = (samples - 1).max(1) as f64;

    let src = image.as_raw();
    map_pixels(width, height, |x, y| {
        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for s in 0..samples {
            let offset = (s as f64 / step_divisor) * length - half_length;
            let px = round_half_up(x as f64 + offset);
            if px >= 0 && px < width as i64 {
                accumulate(&mut sum, src, width, px as u32, y);
                count += 1;
            }
        }
        if count > 0 {
            average(sum, count)
        } else {
            pixel_at(src, width, x, y)
        }
    })
}

/// Rotational blur around the image center.
///
/// Each pixel averages `ceil(2 * radius)` samples taken along the circle
/// through it, with angular offsets spread evenly over a span of
/// `(radius / 10) * (PI / 6)` centered on the pixel's own angle. Sample
/// positions are rounded and clamped to the image. The exact center pixel is
/// left untouched.
pub fn rotational_blur(image: &RgbaImage, radius: f64) -> RgbaImage {
    if radius <= 0.0 || is_empty(image) {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let max_angle = (radius / 10.0) * PI / 6.0;
    let samples = (radius * 2.0).ceil() as i64;

    let src = image.as_raw();
    map_pixels(width, height, |x, y| {
        let dx = x as f64 - center_x;
        let dy = y as f64 - center_y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance == 0.0 {
            return pixel_at(src, width, x, y);
        }

        let base_angle = dy.atan2(dx);
        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for s in 0..samples {
            let fraction = if samples > 1 { s as f64 / (samples - 1) as f64 - 0.5 } else { 0.0 };
            let angle = base_angle + fraction * max_angle;
            let sx = round_half_up(center_x + angle.cos() * distance).clamp(0, width as i64 - 1);
            let sy = round_half_up(center_y + angle.sin() * distance).clamp(0, height as i64 - 1);
            accumulate(&mut sum, src, width, sx as u32, sy as u32);
            count += 1;
        }
        average(sum, count)
    })
}

/// Build a new image by evaluating `f` for every pixel, one row per task.
fn map_pixels<F>(width: u32, height: u32, f: F) -> RgbaImage
where
    F: Fn(u32, u32) -> [u8; 4] + Sync,
{
    let mut output = RgbaImage::new(width, height);
    let row_len = width as usize * 4;
    output.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        for x in 0..width as usize {
            let px = f(x as u32, y as u32);
            row[x * 4..x * 4 + 4].copy_from_slice(&px);
        }
    });
    output
}

fn is_empty(image: &RgbaImage) -> bool {
    image.width() == 0 || image.height() == 0
}

#[inline]
fn pixel_at(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let idx = ((y * width + x) * 4) as usize;
    [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
}

#[inline]
fn accumulate(sum: &mut [u32; 4], data: &[u8], width: u32, x: u32, y: u32) {
    let px = pixel_at(data, width, x, y);
    for c in 0..4 {
        sum[c] += px[c] as u32;
    }
}

#[inline]
fn average(sum: [u32; 4], count: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = (sum[c] as f64 / count as f64).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Round to nearest with halves going toward positive infinity.
#[inline]
fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}
