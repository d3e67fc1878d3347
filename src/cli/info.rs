//! Palette command implementation

use std::process::ExitCode;

use crate::palette;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the palette command
pub fn run_palette(json: bool) -> ExitCode {
    let entries = palette::entries();

    if json {
        return match serde_json::to_string_pretty(&entries) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    println!("Palette ({} colors):", entries.len());
    for entry in &entries {
        println!("  {:>2}  {}  {}", entry.index, entry.hex(), entry.name);
    }
    ExitCode::from(EXIT_SUCCESS)
}
