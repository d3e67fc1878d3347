//! Configuration schema types for `pixelrick.toml`
//!
//! `[defaults]` holds processing options with the same camelCase keys a
//! project file uses; `[output]` controls where and how results are written.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PixelrickError;
use crate::options::ProcessingOptions;
use crate::output::MAX_PREVIEW_SCALE;
use crate::scale::{MAX_TARGET_SIZE, MIN_TARGET_SIZE};

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Nearest-neighbor upscale factor for exported PNGs
    #[serde(default = "default_preview_scale")]
    pub preview_scale: u32,
    /// Directory for generated files; next to the input when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    /// Grid size used when a command does not pass `--size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_size: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { preview_scale: default_preview_scale(), out_dir: None, target_size: None }
    }
}

fn default_preview_scale() -> u32 {
    1
}

/// Root of `pixelrick.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelrickConfig {
    /// Option values every run starts from
    #[serde(default)]
    pub defaults: ProcessingOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "output.preview_scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pixelrick.toml: '{}' {}", self.field, self.message)
    }
}

impl PixelrickConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if let Err(PixelrickError::InvalidOptions(problems)) = self.defaults.validate() {
            errors.extend(
                problems
                    .into_iter()
                    .map(|message| ConfigValidationError { field: "defaults".to_string(), message }),
            );
        }

        if self.output.preview_scale == 0 || self.output.preview_scale > MAX_PREVIEW_SCALE {
            errors.push(ConfigValidationError {
                field: "output.preview_scale".to_string(),
                message: format!("must be between 1 and {}", MAX_PREVIEW_SCALE),
            });
        }

        if let Some(size) = self.output.target_size {
            if !(MIN_TARGET_SIZE..=MAX_TARGET_SIZE).contains(&size) {
                errors.push(ConfigValidationError {
                    field: "output.target_size".to_string(),
                    message: format!("must be between {} and {}", MIN_TARGET_SIZE, MAX_TARGET_SIZE),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DitherType, ResizeHandling};

    #[test]
    fn test_empty_config_parse() {
        let config: PixelrickConfig = toml::from_str("").unwrap();
        assert_eq!(config, PixelrickConfig::default());
        assert_eq!(config.output.preview_scale, 1);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[defaults]
brightness = 10
contrast = 1.2
ditheringType = "bayer4x4"
ditheringIntensity = 30
resizeHandling = "expand"
doCleanupIsolated = true

[defaults.rgbWeights]
r = 0.33
g = 0.33
b = 0.33

[output]
preview_scale = 8
out_dir = "pixels"
target_size = 48
"#;
        let config: PixelrickConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.brightness, 10);
        assert_eq!(config.defaults.dithering_type, DitherType::Bayer4x4);
        assert_eq!(config.defaults.resize_handling, ResizeHandling::Expand);
        assert!(config.defaults.cleanup_isolated);
        assert_eq!(config.defaults.rgb_weights.g, 0.33);
        assert_eq!(config.defaults.jpeg_passes, 1);
        assert_eq!(config.output.preview_scale, 8);
        assert_eq!(config.output.out_dir, Some(PathBuf::from("pixels")));
        assert_eq!(config.output.target_size, Some(48));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validation_reports_each_field() {
        let toml = r#"
[defaults]
jpegPasses = 9

[output]
preview_scale = 0
target_size = 4
"#;
        let config: PixelrickConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "defaults"));
        assert!(errors.iter().any(|e| e.field == "output.preview_scale"));
        assert!(errors.iter().any(|e| e.field == "output.target_size"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigValidationError {
            field: "output.preview_scale".to_string(),
            message: "must be between 1 and 16".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "pixelrick.toml: 'output.preview_scale' must be between 1 and 16"
        );
    }
}
