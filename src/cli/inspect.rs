//! CLI dispatch for the `pixelrick inspect` command.
//!
//! Read-only queries on a finished grid PNG: pixel lookup with optional
//! world coordinates, opaque run counting along a row or column, straight
//! selection counts and palette usage.

use std::path::Path;
use std::process::ExitCode;

use crate::grid::PixelGrid;
use crate::inspect::{
    count_selection, describe_pixel, find_pixel_segments, format_coordinate, CoordinateMapping,
    Direction,
};
use crate::palette;
use crate::source::decode_source_file;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Parse `GX,GY=WX,WY` into an enabled mapping.
fn parse_anchor(input: &str) -> Option<CoordinateMapping> {
    let (grid, world) = input.split_once('=')?;
    let (gx, gy) = grid.split_once(',')?;
    let (wx, wy) = world.split_once(',')?;
    Some(CoordinateMapping::anchored(
        (gx.trim().parse().ok()?, gy.trim().parse().ok()?),
        (wx.trim().parse().ok()?, wy.trim().parse().ok()?),
    ))
}

/// Parse `X1,Y1:X2,Y2` into the two end cells of a selection.
fn parse_selection(input: &str) -> Option<((u32, u32), (u32, u32))> {
    let (start, end) = input.split_once(':')?;
    let cell = |text: &str| -> Option<(u32, u32)> {
        let (x, y) = text.split_once(',')?;
        Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
    };
    Some((cell(start)?, cell(end)?))
}

/// Queries requested on the command line.
#[derive(Debug, Default)]
pub struct InspectQuery<'a> {
    pub point: Option<(u32, u32)>,
    pub row: Option<u32>,
    pub column: Option<u32>,
    pub select: Option<&'a str>,
    pub histogram: bool,
    pub anchor: Option<&'a str>,
}

impl InspectQuery<'_> {
    fn is_empty(&self) -> bool {
        self.point.is_none()
            && self.row.is_none()
            && self.column.is_none()
            && self.select.is_none()
            && !self.histogram
    }
}

/// Execute the inspect command.
pub fn run_inspect(input: &Path, query: &InspectQuery<'_>, json: bool) -> ExitCode {
    if query.is_empty() {
        eprintln!("Error: pass --x and --y, --row, --column, --select, or --histogram");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let selection = match query.select.map(parse_selection) {
        Some(Some((start, end))) => {
            let cells = count_selection(start, end);
            if cells.is_empty() {
                eprintln!("Error: --select must be a horizontal or vertical line");
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
            Some((start, end, cells))
        }
        Some(None) => {
            eprintln!("Error: --select must look like X1,Y1:X2,Y2 (e.g. 0,4:9,4)");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        None => None,
    };

    let mapping = match query.anchor.map(parse_anchor) {
        Some(Some(mapping)) => Some(mapping),
        Some(None) => {
            eprintln!("Error: --anchor must look like GX,GY=WX,WY (e.g. 0,0=-128,64)");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        None => None,
    };

    let grid = match decode_source_file(input) {
        Ok(image) => PixelGrid::new(image),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut report = serde_json::Map::new();

    if let Some((x, y)) = query.point {
        let Some(info) = describe_pixel(&grid, x, y, mapping.as_ref()) else {
            let (w, h) = grid.dimensions();
            eprintln!("Error: ({}, {}) is outside the {}x{} grid", x, y, w, h);
            return ExitCode::from(EXIT_INVALID_ARGS);
        };
        if json {
            report.insert("pixel".to_string(), serde_json::json!(info));
        } else {
            let [r, g, b, a] = info.rgba;
            print!("({}, {}): rgba({}, {}, {}, {})", info.x, info.y, r, g, b, a);
            match (info.palette_index, info.name) {
                (Some(index), Some(name)) => print!("  #{} {}", index, name),
                _ if a == 0 => print!("  transparent"),
                _ => print!("  not in palette"),
            }
            if let Some((wx, wy)) = info.world {
                print!("  world ({}, {})", format_coordinate(wx), format_coordinate(wy));
            }
            println!();
        }
    }

    let line = query
        .row
        .map(|r| (Direction::Horizontal, r))
        .or(query.column.map(|c| (Direction::Vertical, c)));
    if let Some((direction, index)) = line {
        let segments = find_pixel_segments(&grid, direction, index);
        if json {
            report.insert(
                "segments".to_string(),
                serde_json::json!({
                    "direction": direction,
                    "line": index,
                    "runs": segments,
                    "total": segments.iter().map(|s| s.length()).sum::<u32>(),
                }),
            );
        } else {
            let label = match direction {
                Direction::Horizontal => "Row",
                Direction::Vertical => "Column",
            };
            println!("{} {}: {} opaque run(s)", label, index, segments.len());
            for segment in &segments {
                println!("  {}..={}  ({} px)", segment.start, segment.end, segment.length());
            }
        }
    }

    if let Some((start, end, cells)) = &selection {
        let opaque = cells.iter().filter(|(x, y)| grid.is_opaque(*x, *y)).count();
        if json {
            report.insert(
                "selection".to_string(),
                serde_json::json!({
                    "start": start,
                    "end": end,
                    "pixels": cells.len(),
                    "opaque": opaque,
                }),
            );
        } else {
            println!(
                "Selection ({}, {}) -> ({}, {}): {} pixel(s), {} opaque",
                start.0,
                start.1,
                end.0,
                end.1,
                cells.len(),
                opaque
            );
        }
    }

    if query.histogram {
        let counts = grid.palette_histogram();
        let entries = palette::entries();
        if json {
            let used: Vec<_> = entries
                .iter()
                .zip(counts.iter())
                .filter(|(_, count)| **count > 0)
                .map(|(entry, count)| {
                    serde_json::json!({ "index": entry.index, "name": entry.name, "count": count })
                })
                .collect();
            report.insert("histogram".to_string(), serde_json::json!(used));
        } else {
            println!("Palette usage ({} opaque pixel(s)):", grid.opaque_count());
            for (entry, count) in entries.iter().zip(counts.iter()) {
                if *count > 0 {
                    println!("  {:>2}  {}  {:>6}  {}", entry.index, entry.hex(), count, entry.name);
                }
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
