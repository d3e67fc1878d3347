//! Edge enhancement and isolated-pixel cleanup

use image::RgbaImage;

use crate::quantize::Quantizer;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Neighbors required before a pixel is judged isolated.
const MIN_OPAQUE_NEIGHBORS: usize = 4;

/// Sharpen (positive `strength`) or smooth (negative) along edges.
///
/// For each interior pixel the Sobel gradient magnitude of every RGB channel is
/// scaled by `strength` and added to the channel. The result is snapped to the
/// palette right away: a background match clears alpha and keeps the RGB,
/// otherwise the palette color replaces the RGB. Border pixels and alpha of
/// non-background pixels are left as they were. Gradients read from the input
/// only, so earlier updates do not feed later ones.
pub fn enhance_edges(image: &RgbaImage, strength: f64, quantizer: &Quantizer) -> RgbaImage {
    let mut result = image.clone();
    let (width, height) = image.dimensions();
    if strength == 0.0 || width < 3 || height < 3 {
        return result;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = [0i32; 3];
            let mut gy = [0i32; 3];
            for ky in 0..3 {
                for kx in 0..3 {
                    let pixel = image.get_pixel(x + kx - 1, y + ky - 1);
                    let wx = SOBEL_X[ky as usize][kx as usize];
                    let wy = SOBEL_Y[ky as usize][kx as usize];
                    for c in 0..3 {
                        gx[c] += pixel[c] as i32 * wx;
                        gy[c] += pixel[c] as i32 * wy;
                    }
                }
            }

            let original = image.get_pixel(x, y);
            let mut enhanced = [0f64; 3];
            for c in 0..3 {
                let magnitude = ((gx[c] * gx[c] + gy[c] * gy[c]) as f64).sqrt();
                enhanced[c] = (original[c] as f64 + magnitude * strength).clamp(0.0, 255.0);
            }

            let quantized = quantizer.quantize_f64(enhanced);
            let out = result.get_pixel_mut(x, y);
            if quantized.is_background {
                out[3] = 0;
            } else {
                out[0] = quantized.color[0];
                out[1] = quantized.color[1];
                out[2] = quantized.color[2];
            }
        }
    }

    log::debug!("edge enhancement strength {:.2} on {}x{}", strength, width, height);
    result
}

/// Replace opaque pixels whose color appears in none of their opaque neighbors.
///
/// Works in place in raster order, so a pixel replaced earlier in the scan is
/// seen with its new color by later neighbors. Pixels with fewer than four
/// opaque neighbors are skipped. The replacement is the most frequent neighbor
/// color; on a tie the color encountered first wins. Alpha is kept.
///
/// Returns the number of pixels replaced.
pub fn cleanup_isolated_pixels(grid: &mut RgbaImage) -> usize {
    let (width, height) = grid.dimensions();
    let mut changed = 0;

    for y in 0..height {
        for x in 0..width {
            let center = *grid.get_pixel(x, y);
            if center[3] == 0 {
                continue;
            }
            let center_rgb = [center[0], center[1], center[2]];

            let mut neighbors: Vec<[u8; 3]> = Vec::with_capacity(8);
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let neighbor = grid.get_pixel(nx as u32, ny as u32);
                    if neighbor[3] > 0 {
                        neighbors.push([neighbor[0], neighbor[1], neighbor[2]]);
                    }
                }
            }

            if neighbors.len() < MIN_OPAQUE_NEIGHBORS || neighbors.contains(&center_rgb) {
                continue;
            }

            if let Some(replacement) = most_frequent(&neighbors) {
                let pixel = grid.get_pixel_mut(x, y);
                pixel[0] = replacement[0];
                pixel[1] = replacement[1];
                pixel[2] = replacement[2];
                changed += 1;
            }
        }
    }

    log::debug!("cleaned up {} isolated pixels", changed);
    changed
}

/// Most frequent color; ties resolved by first appearance.
fn most_frequent(colors: &[[u8; 3]]) -> Option<[u8; 3]> {
    let mut counts: Vec<([u8; 3], usize)> = Vec::new();
    for color in colors {
        match counts.iter_mut().find(|(c, _)| c == color) {
            Some((_, count)) => *count += 1,
            None => counts.push((*color, 1)),
        }
    }

    let mut best: Option<([u8; 3], usize)> = None;
    for (color, count) in counts {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color)
}
