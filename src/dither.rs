//! Ordered and stochastic dither offsets added to RGB before quantization

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::options::{DitherType, ProcessingOptions};

pub const BAYER_2X2: [[u8; 2]; 2] = [[0, 2], [3, 1]];

pub const BAYER_4X4: [[u8; 4]; 4] =
    [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Peak-to-peak range of the stochastic offset at full intensity.
const NOISE_RANGE: f64 = 64.0;

/// Ordered-dither offset for pixel (`x`, `y`).
///
/// `intensity` is in `[0, 1]`. Pure: the same inputs always give the same
/// offset. Returns 0 for non-Bayer dither types.
pub fn bayer_offset(dither: DitherType, x: u32, y: u32, intensity: f64) -> i32 {
    let (value, size) = match dither {
        DitherType::Bayer2x2 => (BAYER_2X2[(y % 2) as usize][(x % 2) as usize], 2u32),
        DitherType::Bayer4x4 => (BAYER_4X4[(y % 4) as usize][(x % 4) as usize], 4),
        DitherType::Bayer8x8 => (BAYER_8X8[(y % 8) as usize][(x % 8) as usize], 8),
        DitherType::None | DitherType::Floyd => return 0,
    };
    let max_value = (size * size - 1) as f64;
    let normalized = value as f64 / max_value - 0.5;
    round_half_up(normalized * 255.0 * intensity)
}

/// Per-run dither state.
///
/// Ordered types need no state; the stochastic type owns a random generator,
/// seeded when the options carry a seed so a run can be reproduced.
#[derive(Debug)]
pub struct Ditherer {
    kind: DitherType,
    intensity: f64,
    rng: Option<StdRng>,
}

impl Ditherer {
    pub fn new(kind: DitherType, intensity_percent: u8, seed: Option<u64>) -> Self {
        let rng = match kind {
            DitherType::Floyd => Some(match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }),
            _ => None,
        };
        Self { kind, intensity: intensity_percent as f64 / 100.0, rng }
    }

    pub fn from_options(options: &ProcessingOptions) -> Self {
        Self::new(options.dithering_type, options.dithering_intensity, options.dither_seed)
    }

    /// True when offsets can be non-zero.
    pub fn is_active(&self) -> bool {
        self.kind != DitherType::None && self.intensity > 0.0
    }

    /// Offset to add to each of R, G and B of pixel (`x`, `y`).
    pub fn offset(&mut self, x: u32, y: u32) -> i32 {
        if !self.is_active() {
            return 0;
        }
        match (&mut self.rng, self.kind) {
            (Some(rng), DitherType::Floyd) => {
                let noise: f64 = rng.gen::<f64>() - 0.5;
                round_half_up(noise * NOISE_RANGE * self.intensity)
            }
            _ => bayer_offset(self.kind, x, y, self.intensity),
        }
    }
}

/// Apply the same offset to each channel, clamping to `[0, 255]`.
pub fn apply_offset(rgb: [f64; 3], offset: i32) -> [f64; 3] {
    rgb.map(|c| (c + offset as f64).clamp(0.0, 255.0))
}

fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
