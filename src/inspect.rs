//! Read-only queries on a finished grid: pixel lookup, segment counting and
//! grid-to-world coordinate mapping.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::grid::PixelGrid;
use crate::palette::PALETTE_NAMES;

/// Scan direction for segment counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Along a row
    Horizontal,
    /// Along a column
    Vertical,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Horizontal => write!(f, "horizontal"),
            Direction::Vertical => write!(f, "vertical"),
        }
    }
}

/// A run of consecutive opaque pixels, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
}

impl Segment {
    /// Number of pixels in the run.
    pub fn length(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Opaque runs along row or column `line`.
///
/// Returns no segments when `line` is outside the grid.
pub fn find_pixel_segments(grid: &PixelGrid, direction: Direction, line: u32) -> Vec<Segment> {
    let (width, height) = grid.dimensions();
    let (length, in_range) = match direction {
        Direction::Horizontal => (width, line < height),
        Direction::Vertical => (height, line < width),
    };
    if !in_range {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current: Option<Segment> = None;
    for i in 0..length {
        let opaque = match direction {
            Direction::Horizontal => grid.is_opaque(i, line),
            Direction::Vertical => grid.is_opaque(line, i),
        };
        if opaque {
            match current.as_mut() {
                Some(segment) => segment.end = i,
                None => current = Some(Segment { start: i, end: i }),
            }
        } else if let Some(segment) = current.take() {
            segments.push(segment);
        }
    }
    segments.extend(current);
    segments
}

/// Pixels on the straight line between two grid cells.
///
/// Only horizontal and vertical lines are selectable; any other pair yields
/// an empty selection.
pub fn count_selection(start: (u32, u32), end: (u32, u32)) -> Vec<(u32, u32)> {
    if start.0 == end.0 {
        let (lo, hi) = (start.1.min(end.1), start.1.max(end.1));
        (lo..=hi).map(|y| (start.0, y)).collect()
    } else if start.1 == end.1 {
        let (lo, hi) = (start.0.min(end.0), start.0.max(end.0));
        (lo..=hi).map(|x| (x, start.1)).collect()
    } else {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub grid: GridPoint,
    pub world: WorldPoint,
}

/// Translation from grid cells to an external coordinate system, anchored at
/// one reference cell. One cell is one world unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordinateMapping {
    pub is_enabled: bool,
    pub reference_point: ReferencePoint,
    pub show_corner_markers: bool,
}

impl CoordinateMapping {
    /// Enabled mapping that puts grid cell `grid` at world position `world`.
    pub fn anchored(grid: (i64, i64), world: (f64, f64)) -> Self {
        Self {
            is_enabled: true,
            reference_point: ReferencePoint {
                grid: GridPoint { x: grid.0, y: grid.1 },
                world: WorldPoint { x: world.0, y: world.1 },
            },
            show_corner_markers: false,
        }
    }

    /// World position of a grid cell, `None` while the mapping is disabled.
    pub fn grid_to_world(&self, x: i64, y: i64) -> Option<(f64, f64)> {
        if !self.is_enabled {
            return None;
        }
        let reference = &self.reference_point;
        Some((
            reference.world.x + (x - reference.grid.x) as f64,
            reference.world.y + (y - reference.grid.y) as f64,
        ))
    }
}

/// One decimal place, dropping a trailing `.0`.
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Everything known about one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelInfo {
    pub x: u32,
    pub y: u32,
    pub rgba: [u8; 4],
    pub palette_index: Option<usize>,
    pub name: Option<&'static str>,
    pub world: Option<(f64, f64)>,
}

/// Describe grid cell (`x`, `y`); `None` outside the grid.
pub fn describe_pixel(
    grid: &PixelGrid,
    x: u32,
    y: u32,
    mapping: Option<&CoordinateMapping>,
) -> Option<PixelInfo> {
    let pixel = grid.pixel(x, y)?;
    let palette_index = grid.palette_index(x, y);
    Some(PixelInfo {
        x,
        y,
        rgba: pixel.0,
        palette_index,
        name: palette_index.map(|i| PALETTE_NAMES[i]),
        world: mapping.and_then(|m| m.grid_to_world(x as i64, y as i64)),
    })
}
