//! Processing options snapshot and presets
//!
//! A [`ProcessingOptions`] value is captured once per pipeline run. Field names
//! serialize in camelCase so the struct doubles as the `settings` block of a
//! project file.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PixelrickError, Result};

/// Per-channel weights for the color distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbWeights {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for RgbWeights {
    fn default() -> Self {
        WeightPreset::Human.weights()
    }
}

/// Dithering algorithm selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DitherType {
    /// No dithering (default)
    #[default]
    None,
    /// 2x2 Bayer ordered dither
    Bayer2x2,
    /// 4x4 Bayer ordered dither
    Bayer4x4,
    /// 8x8 Bayer ordered dither
    Bayer8x8,
    /// Random-offset approximation of Floyd-Steinberg
    Floyd,
}

impl std::fmt::Display for DitherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DitherType::None => write!(f, "none"),
            DitherType::Bayer2x2 => write!(f, "bayer2x2"),
            DitherType::Bayer4x4 => write!(f, "bayer4x4"),
            DitherType::Bayer8x8 => write!(f, "bayer8x8"),
            DitherType::Floyd => write!(f, "floyd"),
        }
    }
}

/// Which blur-derived bitmap feeds the final scale, and what the target size refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandling {
    /// Keep the original frame; blur spill outside it is cut off (default)
    #[default]
    Crop,
    /// Use the blurred content bounds; target size applies to them
    Fit,
    /// Use the blurred content bounds and grow the target size with them
    Expand,
}

impl std::fmt::Display for ResizeHandling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeHandling::Crop => write!(f, "crop"),
            ResizeHandling::Fit => write!(f, "fit"),
            ResizeHandling::Expand => write!(f, "expand"),
        }
    }
}

/// Display background the grid is designed to sit on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    /// Checkerboard (default); blends on cream, no background matching
    #[default]
    Checkered,
    /// Light cream #F8F4F0
    Light,
    /// Pale green #E3F0D4
    Green,
    /// Sky blue #9EBDFF
    Blue,
    /// Dark #161B22; blends only, no background matching
    Dark,
}

impl BackgroundType {
    /// Color semi-transparent pixels are composited onto before quantization.
    pub fn blend_color(&self) -> [u8; 3] {
        match self {
            BackgroundType::Checkered | BackgroundType::Light => [248, 244, 240],
            BackgroundType::Green => [227, 240, 212],
            BackgroundType::Blue => [158, 189, 255],
            BackgroundType::Dark => [22, 27, 34],
        }
    }

    /// Color that competes with the palette during quantization.
    ///
    /// Only the light, green and blue backgrounds take part.
    pub fn quantization_color(&self) -> Option<[u8; 3]> {
        match self {
            BackgroundType::Light => Some([248, 244, 240]),
            BackgroundType::Green => Some([227, 240, 212]),
            BackgroundType::Blue => Some([158, 189, 255]),
            BackgroundType::Checkered | BackgroundType::Dark => None,
        }
    }
}

impl std::fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackgroundType::Checkered => write!(f, "checkered"),
            BackgroundType::Light => write!(f, "light"),
            BackgroundType::Green => write!(f, "green"),
            BackgroundType::Blue => write!(f, "blue"),
            BackgroundType::Dark => write!(f, "dark"),
        }
    }
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingOptions {
    pub rgb_weights: RgbWeights,
    /// Signed offset added after contrast
    pub brightness: i32,
    /// Multiplier around mid-gray, 1.0 leaves values unchanged
    pub contrast: f64,
    #[serde(rename = "doCleanupIsolated")]
    pub cleanup_isolated: bool,
    /// Positive sharpens, negative smooths
    pub edge_enhancement: f64,
    pub gaussian_blur_percent: f64,
    pub motion_blur_percent: f64,
    pub radial_blur_percent: f64,
    pub dithering_type: DitherType,
    pub dithering_intensity: u8,
    pub jpeg_compression_amount: u8,
    pub jpeg_passes: u8,
    pub resize_handling: ResizeHandling,
    pub background_type: BackgroundType,
    pub background_preference: f64,
    /// Seed for the stochastic dither; entropy-seeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither_seed: Option<u64>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            rgb_weights: RgbWeights::default(),
            brightness: 0,
            contrast: 1.0,
            cleanup_isolated: false,
            edge_enhancement: 0.0,
            gaussian_blur_percent: 0.0,
            motion_blur_percent: 0.0,
            radial_blur_percent: 0.0,
            dithering_type: DitherType::None,
            dithering_intensity: 50,
            jpeg_compression_amount: 0,
            jpeg_passes: 1,
            resize_handling: ResizeHandling::Crop,
            background_type: BackgroundType::Checkered,
            background_preference: 1.0,
            dither_seed: None,
        }
    }
}

impl ProcessingOptions {
    /// Check every field range, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let w = self.rgb_weights;
        if !(w.r >= 0.0 && w.g >= 0.0 && w.b >= 0.0) {
            errors.push("rgb weights must be non-negative".to_string());
        }
        if !(self.contrast >= 0.0) {
            errors.push(format!("contrast must be >= 0 (got {})", self.contrast));
        }
        if !self.edge_enhancement.is_finite() {
            errors.push("edge enhancement must be a finite number".to_string());
        }
        for (name, value) in [
            ("gaussian blur", self.gaussian_blur_percent),
            ("motion blur", self.motion_blur_percent),
            ("radial blur", self.radial_blur_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(format!("{} must be between 0 and 100 percent (got {})", name, value));
            }
        }
        if self.dithering_intensity > 100 {
            errors.push(format!(
                "dithering intensity must be between 0 and 100 (got {})",
                self.dithering_intensity
            ));
        }
        if self.jpeg_compression_amount > 100 {
            errors.push(format!(
                "jpeg compression amount must be between 0 and 100 (got {})",
                self.jpeg_compression_amount
            ));
        }
        if !(1..=5).contains(&self.jpeg_passes) {
            errors.push(format!("jpeg passes must be between 1 and 5 (got {})", self.jpeg_passes));
        }
        if !(self.background_preference >= 0.0) {
            errors.push(format!(
                "background preference must be >= 0 (got {})",
                self.background_preference
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PixelrickError::InvalidOptions(errors))
        }
    }

    /// True when any blur percentage differs, meaning cached blur output is stale.
    pub fn blur_differs(&self, other: &ProcessingOptions) -> bool {
        self.gaussian_blur_percent != other.gaussian_blur_percent
            || self.motion_blur_percent != other.motion_blur_percent
            || self.radial_blur_percent != other.radial_blur_percent
    }

    /// Reset everything except the color weights, the background type and
    /// the compression settings. Applied whenever a new source image is loaded.
    pub fn reset_non_color_settings(&mut self) {
        let defaults = ProcessingOptions::default();
        self.brightness = defaults.brightness;
        self.contrast = defaults.contrast;
        self.cleanup_isolated = defaults.cleanup_isolated;
        self.edge_enhancement = defaults.edge_enhancement;
        self.background_preference = defaults.background_preference;
        self.gaussian_blur_percent = defaults.gaussian_blur_percent;
        self.motion_blur_percent = defaults.motion_blur_percent;
        self.radial_blur_percent = defaults.radial_blur_percent;
        self.dithering_type = defaults.dithering_type;
        self.dithering_intensity = defaults.dithering_intensity;
        self.resize_handling = defaults.resize_handling;
    }
}

/// Named RGB weight combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightPreset {
    /// Luma-style weights matching eye sensitivity
    Human,
    /// Equal weights
    Balanced,
    /// Green-dominant weights
    Green,
}

impl WeightPreset {
    pub fn weights(&self) -> RgbWeights {
        match self {
            WeightPreset::Human => RgbWeights { r: 0.3, g: 0.59, b: 0.11 },
            WeightPreset::Balanced => RgbWeights { r: 0.33, g: 0.33, b: 0.33 },
            WeightPreset::Green => RgbWeights { r: 0.15, g: 0.7, b: 0.15 },
        }
    }

    pub fn apply_to(&self, options: &mut ProcessingOptions) {
        options.rgb_weights = self.weights();
    }
}

/// Named brightness/contrast combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentPreset {
    Reset,
    Bright,
    HighContrast,
}

impl AdjustmentPreset {
    /// (brightness, contrast)
    pub fn values(&self) -> (i32, f64) {
        match self {
            AdjustmentPreset::Reset => (0, 1.0),
            AdjustmentPreset::Bright => (20, 1.2),
            AdjustmentPreset::HighContrast => (0, 1.5),
        }
    }

    pub fn apply_to(&self, options: &mut ProcessingOptions) {
        let (brightness, contrast) = self.values();
        options.brightness = brightness;
        options.contrast = contrast;
    }
}

/// Named cleanup/edge combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EdgePreset {
    None,
    Cleanup,
    Enhance,
    Smooth,
}

impl EdgePreset {
    /// (cleanup isolated pixels, edge strength)
    pub fn values(&self) -> (bool, f64) {
        match self {
            EdgePreset::None => (false, 0.0),
            EdgePreset::Cleanup => (true, 0.0),
            EdgePreset::Enhance => (true, 0.5),
            EdgePreset::Smooth => (true, -0.3),
        }
    }

    pub fn apply_to(&self, options: &mut ProcessingOptions) {
        let (cleanup, strength) = self.values();
        options.cleanup_isolated = cleanup;
        options.edge_enhancement = strength;
    }
}

/// Named compression strength/pass combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JpegPreset {
    None,
    Light,
    Medium,
    Heavy,
    Deepfry,
}

impl JpegPreset {
    /// (compression amount, passes)
    pub fn values(&self) -> (u8, u8) {
        match self {
            JpegPreset::None => (0, 1),
            JpegPreset::Light => (25, 1),
            JpegPreset::Medium => (50, 2),
            JpegPreset::Heavy => (75, 3),
            JpegPreset::Deepfry => (95, 4),
        }
    }

    pub fn apply_to(&self, options: &mut ProcessingOptions) {
        let (amount, passes) = self.values();
        options.jpeg_compression_amount = amount;
        options.jpeg_passes = passes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_every_effect() {
        let options = ProcessingOptions::default();
        assert_eq!(options.gaussian_blur_percent, 0.0);
        assert_eq!(options.motion_blur_percent, 0.0);
        assert_eq!(options.radial_blur_percent, 0.0);
        assert_eq!(options.dithering_type, DitherType::None);
        assert_eq!(options.jpeg_compression_amount, 0);
        assert!(!options.cleanup_isolated);
        assert_eq!(options.edge_enhancement, 0.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let options = ProcessingOptions {
            contrast: -1.0,
            jpeg_passes: 0,
            gaussian_blur_percent: 150.0,
            ..Default::default()
        };
        match options.validate() {
            Err(PixelrickError::InvalidOptions(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected InvalidOptions, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_json_uses_project_field_names() {
        let options = ProcessingOptions::default();
        let json = serde_json::to_value(&options).unwrap();
        assert!(json.get("rgbWeights").is_some());
        assert!(json.get("doCleanupIsolated").is_some());
        assert!(json.get("gaussianBlurPercent").is_some());
        assert_eq!(json["ditheringType"], "none");
        assert_eq!(json["resizeHandling"], "crop");
        assert!(json.get("ditherSeed").is_none());
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let options: ProcessingOptions =
            serde_json::from_str(r#"{"brightness": 12, "ditheringType": "bayer4x4"}"#).unwrap();
        assert_eq!(options.brightness, 12);
        assert_eq!(options.dithering_type, DitherType::Bayer4x4);
        assert_eq!(options.contrast, 1.0);
        assert_eq!(options.jpeg_passes, 1);
    }

    #[test]
    fn test_blur_differs() {
        let a = ProcessingOptions::default();
        let mut b = a.clone();
        b.brightness = 40;
        assert!(!a.blur_differs(&b));
        b.motion_blur_percent = 2.5;
        assert!(a.blur_differs(&b));
    }

    #[test]
    fn test_reset_keeps_color_weights() {
        let mut options = ProcessingOptions {
            rgb_weights: WeightPreset::Green.weights(),
            brightness: 30,
            radial_blur_percent: 4.0,
            dithering_type: DitherType::Floyd,
            resize_handling: ResizeHandling::Expand,
            ..Default::default()
        };
        options.reset_non_color_settings();
        assert_eq!(options.rgb_weights, WeightPreset::Green.weights());
        assert_eq!(options.brightness, 0);
        assert_eq!(options.radial_blur_percent, 0.0);
        assert_eq!(options.dithering_type, DitherType::None);
        assert_eq!(options.resize_handling, ResizeHandling::Crop);
    }

    #[test]
    fn test_presets_apply() {
        let mut options = ProcessingOptions::default();
        JpegPreset::Deepfry.apply_to(&mut options);
        assert_eq!((options.jpeg_compression_amount, options.jpeg_passes), (95, 4));
        EdgePreset::Smooth.apply_to(&mut options);
        assert!(options.cleanup_isolated);
        assert_eq!(options.edge_enhancement, -0.3);
        AdjustmentPreset::Bright.apply_to(&mut options);
        assert_eq!(options.brightness, 20);
    }

    #[test]
    fn test_background_colors() {
        assert_eq!(BackgroundType::Checkered.blend_color(), [248, 244, 240]);
        assert_eq!(BackgroundType::Checkered.quantization_color(), None);
        assert_eq!(BackgroundType::Dark.quantization_color(), None);
        assert_eq!(BackgroundType::Blue.quantization_color(), Some([158, 189, 255]));
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&DitherType::Bayer8x8).unwrap(), "\"bayer8x8\"");
        assert_eq!(serde_json::to_string(&AdjustmentPreset::HighContrast).unwrap(), "\"high-contrast\"");
        let mode: ResizeHandling = serde_json::from_str("\"expand\"").unwrap();
        assert_eq!(mode, ResizeHandling::Expand);
    }
}
