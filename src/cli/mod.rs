//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod inspect;
mod process;
mod project;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, PixelrickConfig};
use crate::error::PixelrickError;
use crate::options::{
    AdjustmentPreset, BackgroundType, DitherType, EdgePreset, JpegPreset, ProcessingOptions,
    ResizeHandling, RgbWeights, WeightPreset,
};

pub use project::ProjectAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixelrick - turn any raster image into fixed-palette pixel art
#[derive(Parser)]
#[command(name = "pixelrick")]
#[command(about = "Pixelrick - turn any raster image into fixed-palette pixel art")]
#[command(version)]
pub struct Cli {
    /// Path to pixelrick.toml (default: search upward from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a PNG or JPEG image into a pixel grid
    Process {
        /// Input image (PNG or JPEG)
        input: PathBuf,

        /// Output file or directory.
        /// If omitted: {input}_pixel.png
        /// If directory (ends with /): dir/{input}_pixel.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Longer side of the grid in pixels (8-1024)
        #[arg(long)]
        size: Option<u32>,

        /// Also save a project file to this path
        #[arg(long)]
        project: Option<PathBuf>,

        /// Upscale the exported PNG by an integer factor (1-16)
        #[arg(long)]
        preview_scale: Option<u32>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Create, inspect, export and reprocess project files
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// List the palette (index, name, hex)
    Palette {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up pixels, count runs and selections, and tally palette usage in a grid PNG
    Inspect {
        /// Grid image to inspect
        input: PathBuf,

        /// Column of the pixel to describe (requires --y)
        #[arg(long, requires = "y")]
        x: Option<u32>,

        /// Row of the pixel to describe (requires --x)
        #[arg(long, requires = "x")]
        y: Option<u32>,

        /// Count opaque runs along this row
        #[arg(long, conflicts_with = "column")]
        row: Option<u32>,

        /// Count opaque runs along this column
        #[arg(long)]
        column: Option<u32>,

        /// Count pixels on a straight selection line: X1,Y1:X2,Y2
        #[arg(long)]
        select: Option<String>,

        /// Count pixels per palette color
        #[arg(long)]
        histogram: bool,

        /// Map grid cells to world coordinates: GX,GY=WX,WY
        #[arg(long)]
        anchor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Processing option flags shared by every command that runs the pipeline.
///
/// Presets are applied first, then individual values on top.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// RGB weight preset for color matching
    #[arg(long, value_enum)]
    pub weights: Option<WeightPreset>,

    /// Custom RGB weights as R,G,B (e.g. 0.3,0.59,0.11)
    #[arg(long, conflicts_with = "weights")]
    pub rgb_weights: Option<String>,

    /// Brightness/contrast preset
    #[arg(long, value_enum)]
    pub adjust: Option<AdjustmentPreset>,

    /// Brightness offset (-100 to 100)
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<i32>,

    /// Contrast multiplier (1.0 = unchanged)
    #[arg(long)]
    pub contrast: Option<f64>,

    /// Edge/cleanup preset
    #[arg(long, value_enum)]
    pub edges: Option<EdgePreset>,

    /// Remove isolated pixels after quantization
    #[arg(long)]
    pub cleanup: bool,

    /// Edge enhancement strength (negative smooths)
    #[arg(long, allow_hyphen_values = true)]
    pub edge_strength: Option<f64>,

    /// Gaussian blur radius as a percentage of the image size
    #[arg(long)]
    pub gaussian: Option<f64>,

    /// Horizontal motion blur length as a percentage of the image size
    #[arg(long)]
    pub motion: Option<f64>,

    /// Rotational blur radius as a percentage of the image size
    #[arg(long)]
    pub radial: Option<f64>,

    /// Dithering algorithm
    #[arg(long, value_enum)]
    pub dither: Option<DitherType>,

    /// Dithering intensity (0-100)
    #[arg(long)]
    pub dither_intensity: Option<u8>,

    /// Seed for the stochastic dither
    #[arg(long)]
    pub dither_seed: Option<u64>,

    /// Compression preset
    #[arg(long, value_enum)]
    pub jpeg_preset: Option<JpegPreset>,

    /// Compression strength (0-100)
    #[arg(long)]
    pub jpeg: Option<u8>,

    /// Number of compression passes (1-5)
    #[arg(long)]
    pub jpeg_passes: Option<u8>,

    /// Resize handling when blur spills outside the frame
    #[arg(long, value_enum)]
    pub resize: Option<ResizeHandling>,

    /// Display background the grid is designed for
    #[arg(long, value_enum)]
    pub background: Option<BackgroundType>,

    /// How strongly the background color competes with the palette
    #[arg(long)]
    pub background_preference: Option<f64>,
}

impl OptionArgs {
    /// Apply presets and explicit values on top of `options`.
    pub fn apply_to(&self, options: &mut ProcessingOptions) -> Result<(), PixelrickError> {
        if let Some(preset) = self.weights {
            preset.apply_to(options);
        }
        if let Some(ref weights) = self.rgb_weights {
            options.rgb_weights = parse_rgb_weights(weights)?;
        }
        if let Some(preset) = self.adjust {
            preset.apply_to(options);
        }
        if let Some(preset) = self.edges {
            preset.apply_to(options);
        }
        if let Some(preset) = self.jpeg_preset {
            preset.apply_to(options);
        }

        if let Some(v) = self.brightness {
            options.brightness = v;
        }
        if let Some(v) = self.contrast {
            options.contrast = v;
        }
        if self.cleanup {
            options.cleanup_isolated = true;
        }
        if let Some(v) = self.edge_strength {
            options.edge_enhancement = v;
        }
        if let Some(v) = self.gaussian {
            options.gaussian_blur_percent = v;
        }
        if let Some(v) = self.motion {
            options.motion_blur_percent = v;
        }
        if let Some(v) = self.radial {
            options.radial_blur_percent = v;
        }
        if let Some(v) = self.dither {
            options.dithering_type = v;
        }
        if let Some(v) = self.dither_intensity {
            options.dithering_intensity = v;
        }
        if let Some(v) = self.dither_seed {
            options.dither_seed = Some(v);
        }
        if let Some(v) = self.jpeg {
            options.jpeg_compression_amount = v;
        }
        if let Some(v) = self.jpeg_passes {
            options.jpeg_passes = v;
        }
        if let Some(v) = self.resize {
            options.resize_handling = v;
        }
        if let Some(v) = self.background {
            options.background_type = v;
        }
        if let Some(v) = self.background_preference {
            options.background_preference = v;
        }

        options.validate()
    }

    /// True when no flag was given.
    pub fn is_empty(&self) -> bool {
        self.weights.is_none()
            && self.rgb_weights.is_none()
            && self.adjust.is_none()
            && self.brightness.is_none()
            && self.contrast.is_none()
            && self.edges.is_none()
            && !self.cleanup
            && self.edge_strength.is_none()
            && self.gaussian.is_none()
            && self.motion.is_none()
            && self.radial.is_none()
            && self.dither.is_none()
            && self.dither_intensity.is_none()
            && self.dither_seed.is_none()
            && self.jpeg_preset.is_none()
            && self.jpeg.is_none()
            && self.jpeg_passes.is_none()
            && self.resize.is_none()
            && self.background.is_none()
            && self.background_preference.is_none()
    }
}

/// Parse "R,G,B" into weights.
fn parse_rgb_weights(input: &str) -> Result<RgbWeights, PixelrickError> {
    let values: Vec<f64> = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| PixelrickError::InvalidOptions(vec![format!("rgb weights: {}", e)]))?;

    match values.as_slice() {
        [r, g, b] => Ok(RgbWeights { r: *r, g: *g, b: *b }),
        _ => Err(PixelrickError::InvalidOptions(vec![format!(
            "rgb weights must be three comma-separated numbers (got '{}')",
            input
        )])),
    }
}

/// Load pixelrick.toml and apply CLI overrides, printing any error.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<PixelrickConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Exit code for a pipeline error: bad user input maps to invalid-arguments.
pub(crate) fn exit_code_for(error: &PixelrickError) -> ExitCode {
    match error {
        PixelrickError::InvalidScaleTarget(_)
        | PixelrickError::InvalidDimension(_)
        | PixelrickError::InvalidOptions(_) => ExitCode::from(EXIT_INVALID_ARGS),
        _ => ExitCode::from(EXIT_ERROR),
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Process { input, output, size, project, preview_scale, options } => {
            process::run_process(
                &input,
                output.as_deref(),
                size,
                project.as_deref(),
                preview_scale,
                &options,
                config,
            )
        }
        Commands::Project { action } => project::run_project(action, config),
        Commands::Palette { json } => info::run_palette(json),
        Commands::Inspect { input, x, y, row, column, select, histogram, anchor, json } => {
            let query = inspect::InspectQuery {
                point: x.zip(y),
                row,
                column,
                select: select.as_deref(),
                histogram,
                anchor: anchor.as_deref(),
            };
            inspect::run_inspect(&input, &query, json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_flags() {
        let cli = Cli::try_parse_from([
            "pixelrick",
            "process",
            "photo.png",
            "--size",
            "32",
            "--dither",
            "bayer4x4",
            "--brightness",
            "-20",
            "--resize",
            "expand",
        ])
        .unwrap();
        match cli.command {
            Commands::Process { size, options, .. } => {
                assert_eq!(size, Some(32));
                assert_eq!(options.dither, Some(DitherType::Bayer4x4));
                assert_eq!(options.brightness, Some(-20));
                assert_eq!(options.resize, Some(ResizeHandling::Expand));
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_inspect_x_requires_y() {
        assert!(Cli::try_parse_from(["pixelrick", "inspect", "grid.png", "--x", "3"]).is_err());
        assert!(Cli::try_parse_from(["pixelrick", "inspect", "grid.png", "--x", "3", "--y", "1"])
            .is_ok());
    }

    #[test]
    fn test_blur_flags_share_size_units() {
        use clap::CommandFactory;
        let command = Cli::command();
        let process = command.find_subcommand("process").unwrap();
        for flag in ["gaussian", "motion", "radial"] {
            let arg = process.get_arguments().find(|a| a.get_id() == flag).unwrap();
            let help = arg.get_help().unwrap().to_string();
            assert!(help.contains("percentage of the image size"), "--{}: {}", flag, help);
        }
    }

    #[test]
    fn test_parse_inspect_selection_flags() {
        let cli = Cli::try_parse_from([
            "pixelrick",
            "inspect",
            "grid.png",
            "--select",
            "1,2:1,6",
            "--histogram",
        ])
        .unwrap();
        match cli.command {
            Commands::Inspect { select, histogram, .. } => {
                assert_eq!(select.as_deref(), Some("1,2:1,6"));
                assert!(histogram);
            }
            _ => panic!("expected inspect command"),
        }
    }

    #[test]
    fn test_presets_then_explicit_values() {
        let args = OptionArgs {
            adjust: Some(AdjustmentPreset::Bright),
            contrast: Some(1.1),
            jpeg_preset: Some(JpegPreset::Heavy),
            ..Default::default()
        };
        let mut options = ProcessingOptions::default();
        args.apply_to(&mut options).unwrap();
        assert_eq!(options.brightness, 20);
        assert_eq!(options.contrast, 1.1);
        assert_eq!(options.jpeg_compression_amount, 75);
        assert_eq!(options.jpeg_passes, 3);
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let args = OptionArgs { jpeg_passes: Some(9), ..Default::default() };
        let mut options = ProcessingOptions::default();
        assert!(matches!(args.apply_to(&mut options), Err(PixelrickError::InvalidOptions(_))));
    }

    #[test]
    fn test_parse_rgb_weights() {
        let weights = parse_rgb_weights("0.2, 0.5,0.3").unwrap();
        assert_eq!(weights, RgbWeights { r: 0.2, g: 0.5, b: 0.3 });
        assert!(parse_rgb_weights("1,2").is_err());
        assert!(parse_rgb_weights("a,b,c").is_err());
    }

    #[test]
    fn test_empty_option_args() {
        assert!(OptionArgs::default().is_empty());
        assert!(!OptionArgs { cleanup: true, ..Default::default() }.is_empty());
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            exit_code_for(&PixelrickError::InvalidScaleTarget("3".into())),
            ExitCode::from(EXIT_INVALID_ARGS)
        );
        assert_eq!(exit_code_for(&PixelrickError::NoSource), ExitCode::from(EXIT_ERROR));
    }
}
