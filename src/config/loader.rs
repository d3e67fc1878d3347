//! Configuration loading and discovery for `pixelrick.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PixelrickConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "pixelrick.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pixelrick.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out_dir: Option<PathBuf>,
    /// Override preview upscale factor
    pub preview_scale: Option<u32>,
    /// Override grid target size
    pub target_size: Option<u32>,
}

/// Find pixelrick.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pixelrick.toml
/// 2. Check XDG_CONFIG_HOME/pixelrick/pixelrick.toml (or ~/.config/pixelrick/pixelrick.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pixelrick.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixelrick").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find pixelrick.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pixelrick.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Arguments
/// - `path` - Optional path to a pixelrick.toml file
pub fn load_config(path: Option<&Path>) -> Result<PixelrickConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(PixelrickConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<PixelrickConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PixelrickConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PixelrickConfig, overrides: &CliOverrides) {
    if let Some(ref out_dir) = overrides.out_dir {
        config.output.out_dir = Some(out_dir.clone());
    }

    if let Some(preview_scale) = overrides.preview_scale {
        config.output.preview_scale = preview_scale;
    }

    if let Some(target_size) = overrides.target_size {
        config.output.target_size = Some(target_size);
    }
}
