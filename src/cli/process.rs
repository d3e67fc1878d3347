//! Process command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{CliOverrides, PixelrickConfig};
use crate::error::{PixelrickError, Result};
use crate::options::ProcessingOptions;
use crate::output::{generate_output_path, save_png, scale_image};
use crate::pipeline::Pipeline;
use crate::project::Project;
use crate::scale::{validate_target_size, AUTO_SCALE_LIMIT};
use crate::source::decode_source_file;

use super::{exit_code_for, resolve_config, OptionArgs, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the process command
pub fn run_process(
    input: &Path,
    output: Option<&Path>,
    size: Option<u32>,
    project: Option<&Path>,
    preview_scale: Option<u32>,
    args: &OptionArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { preview_scale, target_size: size, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = match options_from(&config, args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let pipeline = match process_file(input, options, config.output.target_size) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
    };

    let output_arg = output_destination(output, &config);
    let output_path = generate_output_path(input, output_arg.as_deref(), "png");
    if let Err(e) = export_grid(&pipeline, &output_path, config.output.preview_scale) {
        eprintln!("Error: {}", e);
        return exit_code_for(&e);
    }

    if let Some(project_path) = project {
        let result = Project::from_pipeline(&pipeline).and_then(|p| p.save(project_path));
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
        println!("Saved project {}", project_path.display());
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Config defaults with CLI flags applied on top.
pub(super) fn options_from(config: &PixelrickConfig, args: &OptionArgs) -> Result<ProcessingOptions> {
    let mut options = config.defaults.clone();
    args.apply_to(&mut options)?;
    Ok(options)
}

/// Decode `input` and run the pipeline with `options` as given.
///
/// Without a target size the source is processed the way a fresh load would
/// be: sources past 64 pixels are scaled down to 64, smaller ones keep
/// their size. A target size rescales the source to that size.
pub(super) fn process_file(
    input: &Path,
    options: ProcessingOptions,
    target_size: Option<u32>,
) -> Result<Pipeline> {
    let image = decode_source_file(input)?;
    let natural = image.width().max(image.height());
    let size = match target_size {
        Some(size) => validate_target_size(size)?,
        None => natural.min(AUTO_SCALE_LIMIT),
    };

    log::info!(
        "processing {} ({}x{}) at size {}",
        input.display(),
        image.width(),
        image.height(),
        size
    );

    let mut pipeline = Pipeline::default();
    pipeline.restore(image, options, size, size)?;
    Ok(pipeline)
}

/// `-o` wins; otherwise the configured output directory, if any.
pub(super) fn output_destination(output: Option<&Path>, config: &PixelrickConfig) -> Option<PathBuf> {
    output.map(Path::to_path_buf).or_else(|| config.output.out_dir.as_ref().map(|d| d.join("")))
}

/// Write the current grid, upscaled for preview, and print a summary line.
pub(super) fn export_grid(pipeline: &Pipeline, path: &Path, preview_scale: u32) -> Result<()> {
    let grid = pipeline.grid().ok_or(PixelrickError::NoSource)?;
    let (width, height) = grid.dimensions();
    let image = scale_image(grid.as_image().clone(), preview_scale);
    save_png(&image, path)?;

    println!(
        "Wrote {} ({}x{} grid, {} opaque pixels)",
        path.display(),
        width,
        height,
        grid.opaque_count()
    );
    if let Some(info) = pipeline.image_info() {
        if let Some((w, h)) = info.expanded {
            println!("  blur expanded the content to {}x{}", w, h);
        }
    }
    Ok(())
}
