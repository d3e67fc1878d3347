//! Project command implementations (save, info, export, reprocess)

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::output::{generate_output_path, save_png, scale_image};
use crate::pipeline::Pipeline;
use crate::project::{Project, PROJECT_EXTENSION};

use super::process::{export_grid, options_from, output_destination, process_file};
use super::{exit_code_for, resolve_config, OptionArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Process an image and save it as a project file
    Save {
        /// Input image (PNG or JPEG)
        input: PathBuf,

        /// Project file to write (default: {input}_pixel.pxlrck)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Longer side of the grid in pixels (8-1024)
        #[arg(long)]
        size: Option<u32>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the metadata and settings stored in a project file
    Info {
        /// Project file
        project: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the stored grid of a project file as PNG
    Export {
        /// Project file
        project: PathBuf,

        /// Output PNG (default: {project}_pixel.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upscale the exported PNG by an integer factor (1-16)
        #[arg(long)]
        preview_scale: Option<u32>,
    },

    /// Re-run the pipeline from the stored original and settings
    Reprocess {
        /// Project file
        project: PathBuf,

        /// Output PNG (default: {project}_pixel.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the updated project back to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Upscale the exported PNG by an integer factor (1-16)
        #[arg(long)]
        preview_scale: Option<u32>,

        /// Override the stored target size
        #[arg(long)]
        size: Option<u32>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Execute a project subcommand
pub fn run_project(action: ProjectAction, config_path: Option<&Path>) -> ExitCode {
    match action {
        ProjectAction::Save { input, output, size, options } => {
            run_save(&input, output.as_deref(), size, &options, config_path)
        }
        ProjectAction::Info { project, json } => run_info(&project, json),
        ProjectAction::Export { project, output, preview_scale } => {
            run_export(&project, output.as_deref(), preview_scale, config_path)
        }
        ProjectAction::Reprocess { project, output, save, preview_scale, size, options } => {
            run_reprocess(
                &project,
                output.as_deref(),
                save.as_deref(),
                preview_scale,
                size,
                &options,
                config_path,
            )
        }
    }
}

fn load_project(path: &Path) -> Result<Project, ExitCode> {
    Project::load(path).map_err(|e| {
        eprintln!("Error: {}: {}", path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

fn run_save(
    input: &Path,
    output: Option<&Path>,
    size: Option<u32>,
    args: &OptionArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { target_size: size, ..Default::default() };
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

    let output_arg = output_destination(output, &config);
    let project_path = generate_output_path(input, output_arg.as_deref(), PROJECT_EXTENSION);
    let result = process_file(input, options, config.output.target_size)
        .and_then(|pipeline| Project::from_pipeline(&pipeline))
        .and_then(|project| project.save(&project_path).map(|_| project));

    match result {
        Ok(project) => {
            let dims = project.metadata.final_dimensions;
            println!(
                "Saved project {} ({}x{} grid)",
                project_path.display(),
                dims.width,
                dims.height
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}

fn run_info(path: &Path, json: bool) -> ExitCode {
    let project = match load_project(path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if json {
        let summary = serde_json::json!({
            "version": project.version,
            "metadata": project.metadata,
            "settings": project.settings,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let meta = &project.metadata;
    let settings = &project.settings;
    let options = &settings.options;
    println!("Project: {}", path.display());
    println!("  Version:   {}", project.version);
    println!("  Saved:     {}", meta.timestamp.to_rfc3339());
    println!(
        "  Original:  {}x{}",
        meta.original_dimensions.width, meta.original_dimensions.height
    );
    println!("  Grid:      {}x{}", meta.final_dimensions.width, meta.final_dimensions.height);
    if let Some(size) = settings.scale_size {
        println!("  Scale:     {}", size);
    }
    println!();
    println!("Settings:");
    println!(
        "  RGB weights:  {:.2}, {:.2}, {:.2}",
        options.rgb_weights.r, options.rgb_weights.g, options.rgb_weights.b
    );
    println!("  Brightness:   {}", options.brightness);
    println!("  Contrast:     {}", options.contrast);
    println!("  Cleanup:      {}", options.cleanup_isolated);
    println!("  Edges:        {}", options.edge_enhancement);
    println!(
        "  Blur:         gaussian {}%, motion {}%, radial {}%",
        options.gaussian_blur_percent, options.motion_blur_percent, options.radial_blur_percent
    );
    println!("  Dithering:    {} ({}%)", options.dithering_type, options.dithering_intensity);
    println!(
        "  Compression:  {}% x{}",
        options.jpeg_compression_amount, options.jpeg_passes
    );
    println!("  Resize:       {}", options.resize_handling);
    println!(
        "  Background:   {} (preference {})",
        options.background_type, options.background_preference
    );
    ExitCode::from(EXIT_SUCCESS)
}

fn run_export(
    path: &Path,
    output: Option<&Path>,
    preview_scale: Option<u32>,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { preview_scale, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let project = match load_project(path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let output_arg = output_destination(output, &config);
    let output_path = generate_output_path(path, output_arg.as_deref(), "png");
    let result = project.grid().and_then(|grid| {
        let image = scale_image(grid.into_image(), config.output.preview_scale);
        save_png(&image, &output_path)
    });

    match result {
        Ok(()) => {
            println!("Wrote {}", output_path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}

fn run_reprocess(
    path: &Path,
    output: Option<&Path>,
    save: Option<&Path>,
    preview_scale: Option<u32>,
    size: Option<u32>,
    args: &OptionArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { preview_scale, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let mut project = match load_project(path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if let Err(e) = args.apply_to(&mut project.settings.options) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if !args.is_empty() {
        log::info!("reprocessing with modified settings");
    }

    let mut pipeline = Pipeline::default();
    let result = project.restore_into(&mut pipeline).and_then(|_| match size {
        Some(size) => pipeline.set_target_size(size).map(|_| ()),
        None => Ok(()),
    });
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return exit_code_for(&e);
    }

    let output_arg = output_destination(output, &config);
    let output_path = generate_output_path(path, output_arg.as_deref(), "png");
    if let Err(e) = export_grid(&pipeline, &output_path, config.output.preview_scale) {
        eprintln!("Error: {}", e);
        return exit_code_for(&e);
    }

    if let Some(save_path) = save {
        let result = Project::from_pipeline(&pipeline).and_then(|mut updated| {
            updated.settings.pixel_size = project.settings.pixel_size;
            updated.settings.coordinate_mapping = project.settings.coordinate_mapping;
            updated.save(save_path)
        });
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
        println!("Saved project {}", save_path.display());
    }

    ExitCode::from(EXIT_SUCCESS)
}
