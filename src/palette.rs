//! The fixed 31-color output palette.
//!
//! Palette index is the identity of a color: saved projects rely on it to
//! migrate grids that were quantized against the older 30-color palette.

use image::Rgba;
use serde::Serialize;

/// Number of entries in the current palette.
pub const PALETTE_LEN: usize = 31;

/// Current palette, in display order.
pub const PALETTE: [[u8; 3]; PALETTE_LEN] = [
    [0, 0, 0],
    [60, 60, 60],
    [120, 120, 120],
    [210, 210, 210],
    [255, 255, 255],
    [96, 0, 24],
    [237, 28, 36],
    [255, 127, 39],
    [246, 170, 9],
    [249, 221, 59],
    [255, 250, 188],
    [14, 185, 104],
    [19, 230, 123],
    [135, 255, 94],
    [12, 129, 110],
    [16, 174, 166],
    [19, 225, 190],
    [40, 80, 158],
    [64, 147, 228],
    [96, 247, 242],
    [107, 80, 246],
    [153, 177, 251],
    [120, 12, 153],
    [170, 56, 185],
    [224, 159, 249],
    [203, 0, 122],
    [236, 31, 128],
    [243, 141, 169],
    [104, 70, 52],
    [149, 104, 42],
    [248, 178, 119],
];

/// Human-readable names, parallel to [`PALETTE`].
pub const PALETTE_NAMES: [&str; PALETTE_LEN] = [
    "Black",
    "Dark Gray",
    "Gray",
    "Light Gray",
    "White",
    "Deep Red",
    "Red",
    "Orange",
    "Gold",
    "Yellow",
    "Light Yellow",
    "Dark Green",
    "Green",
    "Light Green",
    "Dark Teal",
    "Teal",
    "Light Teal",
    "Dark Blue",
    "Blue",
    "Cyan",
    "Indigo",
    "Light Indigo",
    "Dark Purple",
    "Purple",
    "Light Purple",
    "Dark Pink",
    "Pink",
    "Light Pink",
    "Dark Brown",
    "Brown",
    "Beige",
];

/// Palette used by projects saved before the current one was introduced.
pub const LEGACY_PALETTE: [[u8; 3]; 30] = [
    [0, 0, 0],
    [68, 68, 68],
    [136, 136, 136],
    [187, 187, 187],
    [255, 255, 255],
    [136, 0, 21],
    [255, 34, 34],
    [255, 136, 0],
    [255, 221, 0],
    [255, 255, 51],
    [255, 255, 187],
    [34, 102, 34],
    [68, 170, 51],
    [85, 204, 68],
    [187, 255, 187],
    [0, 136, 136],
    [0, 85, 85],
    [68, 255, 255],
    [0, 0, 136],
    [51, 68, 255],
    [187, 221, 255],
    [136, 34, 221],
    [221, 187, 255],
    [68, 34, 136],
    [255, 68, 255],
    [255, 187, 221],
    [255, 221, 238],
    [136, 68, 0],
    [170, 85, 0],
    [255, 221, 187],
];

/// A single palette entry, as listed by the CLI and the WASM binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub index: usize,
    pub name: &'static str,
    pub rgb: [u8; 3],
}

impl PaletteEntry {
    /// `#RRGGBB` representation.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

/// All palette entries in order.
pub fn entries() -> Vec<PaletteEntry> {
    PALETTE
        .iter()
        .zip(PALETTE_NAMES.iter())
        .enumerate()
        .map(|(index, (rgb, name))| PaletteEntry { index, name, rgb: *rgb })
        .collect()
}

/// Index of the palette entry exactly equal to `rgb`, if any.
pub fn find_index(rgb: [u8; 3]) -> Option<usize> {
    PALETTE.iter().position(|c| *c == rgb)
}

/// Name of the palette entry exactly equal to `rgb`, if any.
pub fn name_of(rgb: [u8; 3]) -> Option<&'static str> {
    find_index(rgb).map(|i| PALETTE_NAMES[i])
}

/// Index of the legacy palette entry exactly equal to `rgb`, if any.
pub fn find_legacy_index(rgb: [u8; 3]) -> Option<usize> {
    LEGACY_PALETTE.iter().position(|c| *c == rgb)
}

/// Map a pixel quantized against the legacy palette to the current palette.
///
/// The color at the same index is used and alpha is preserved. Pixels that
/// match no legacy entry are returned unchanged.
pub fn migrate_legacy_pixel(pixel: Rgba<u8>) -> Rgba<u8> {
    let rgb = [pixel[0], pixel[1], pixel[2]];
    match find_legacy_index(rgb) {
        Some(index) if index < PALETTE_LEN => {
            let [r, g, b] = PALETTE[index];
            Rgba([r, g, b, pixel[3]])
        }
        _ => pixel,
    }
}
