//! Pixelrick - turn any raster image into fixed-palette pixel art
//!
//! This library provides functionality to:
//! - Scale, blur and crop/fit/expand a source image
//! - Enhance edges, dither and simulate lossy compression
//! - Quantize to a 31-color palette with background awareness
//! - Save and load project files with legacy palette migration
//!
//! The [`pipeline::Pipeline`] type drives every stage and discards results
//! from runs that have been superseded by newer input.

pub mod blur;
pub mod bounds;
pub mod cli;
pub mod compression;
pub mod config;
pub mod dither;
pub mod edge;
pub mod error;
pub mod grid;
pub mod inspect;
pub mod options;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod project;
pub mod quantize;
pub mod resize_mode;
pub mod scale;
pub mod source;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{PixelrickError, Result};
pub use grid::PixelGrid;
pub use options::ProcessingOptions;
pub use pipeline::{Pipeline, RunOutcome};
pub use project::Project;
