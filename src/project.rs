//! Project files: options, source image and finished grid bundled as JSON
//!
//! Images are embedded as `data:image/png;base64,...` URLs. Grids saved
//! against the legacy palette are migrated to the current palette on load.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PixelrickError, Result};
use crate::grid::PixelGrid;
use crate::inspect::CoordinateMapping;
use crate::options::ProcessingOptions;
use crate::output::encode_png;
use crate::palette::migrate_legacy_pixel;
use crate::pipeline::{Pipeline, RunOutcome};
use crate::source::decode_source_bytes;

/// Format version written by this crate.
pub const PROJECT_VERSION: &str = "2.0";
/// File extension for project files.
pub const PROJECT_EXTENSION: &str = "pxlrck";

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Options plus the sizing and display state needed to reproduce a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(flatten)]
    pub options: ProcessingOptions,
    /// Longer side of the working source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_size: Option<u32>,
    /// Longer side of the grid requested by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_size: Option<u32>,
    /// Display zoom (screen pixels per grid cell)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_mapping: Option<CoordinateMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub timestamp: DateTime<Utc>,
    pub original_dimensions: Dimensions,
    pub final_dimensions: Dimensions,
}

/// A saved project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    pub settings: ProjectSettings,
    /// PNG data URL of the original source image
    pub original_image: String,
    /// PNG data URL of the finished grid
    pub processed_grid: String,
    pub metadata: ProjectMetadata,
}

impl Project {
    /// Bundle a source image, its grid and the settings that produced it.
    pub fn new(original: &RgbaImage, grid: &PixelGrid, settings: ProjectSettings) -> Result<Self> {
        Ok(Self {
            version: PROJECT_VERSION.to_string(),
            settings,
            original_image: encode_data_url(original)?,
            processed_grid: encode_data_url(grid.as_image())?,
            metadata: ProjectMetadata {
                timestamp: Utc::now(),
                original_dimensions: original.dimensions().into(),
                final_dimensions: grid.dimensions().into(),
            },
        })
    }

    /// Capture the current state of a pipeline that has produced a grid.
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Self> {
        let original = pipeline.original().ok_or(PixelrickError::NoSource)?;
        let grid = pipeline.grid().ok_or(PixelrickError::NoSource)?;
        let scale_size = pipeline.source().map(|s| s.width().max(s.height()));
        let settings = ProjectSettings {
            options: pipeline.options().clone(),
            scale_size,
            target_size: Some(pipeline.target_size()),
            pixel_size: None,
            coordinate_mapping: None,
        };
        Self::new(original, grid, settings)
    }

    /// Parse a project from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let project: Project = serde_json::from_str(json)
            .map_err(|e| PixelrickError::CorruptProjectFile(e.to_string()))?;
        if project.version != PROJECT_VERSION {
            log::warn!(
                "project version {} differs from {}; loading anyway",
                project.version,
                PROJECT_VERSION
            );
        }
        Ok(project)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PixelrickError::CorruptProjectFile(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("saved project to {}", path.display());
        Ok(())
    }

    /// Decode the embedded source image.
    pub fn original(&self) -> Result<RgbaImage> {
        decode_data_url(&self.original_image)
    }

    /// Decode the embedded grid, migrating legacy palette colors.
    pub fn grid(&self) -> Result<PixelGrid> {
        let image = decode_data_url(&self.processed_grid)?;
        Ok(migrate_legacy_grid(image))
    }

    /// Load the original image and saved settings into `pipeline` and process
    /// them again.
    pub fn restore_into(&self, pipeline: &mut Pipeline) -> Result<RunOutcome> {
        let original = self.original()?;
        let natural = original.width().max(original.height());
        let scale_size = self.settings.scale_size.unwrap_or(natural);
        let target_size = self.settings.target_size.unwrap_or(scale_size);
        pipeline.restore(original, self.settings.options.clone(), scale_size, target_size)
    }
}

/// Remap every pixel matching a legacy palette color to the current palette.
pub fn migrate_legacy_grid(mut image: RgbaImage) -> PixelGrid {
    for pixel in image.pixels_mut() {
        *pixel = migrate_legacy_pixel(*pixel);
    }
    PixelGrid::new(image)
}

/// Encode an image as a PNG data URL.
pub fn encode_data_url(image: &RgbaImage) -> Result<String> {
    let png = encode_png(image)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
}

/// Decode a base64 image data URL (PNG or JPEG payload).
pub fn decode_data_url(url: &str) -> Result<RgbaImage> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or_else(|| PixelrickError::CorruptProjectFile("image is not a base64 data URL".into()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PixelrickError::CorruptProjectFile(format!("invalid base64: {}", e)))?;

    decode_source_bytes(&bytes)
        .map_err(|e| PixelrickError::CorruptProjectFile(format!("embedded image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DitherType;
    use crate::palette::{LEGACY_PALETTE, PALETTE};
    use image::Rgba;

    fn sample_project() -> Project {
        let original = RgbaImage::from_pixel(4, 2, Rgba([200, 30, 30, 255]));
        let grid = PixelGrid::new(RgbaImage::from_pixel(4, 2, Rgba([237, 28, 36, 255])));
        let settings = ProjectSettings {
            options: ProcessingOptions {
                dithering_type: DitherType::Bayer2x2,
                brightness: -10,
                ..Default::default()
            },
            scale_size: Some(4),
            target_size: Some(4),
            pixel_size: Some(5),
            coordinate_mapping: Some(CoordinateMapping::anchored((0, 0), (10.0, 20.0))),
        };
        Project::new(&original, &grid, settings).unwrap()
    }

    #[test]
    fn test_json_layout() {
        let project = sample_project();
        let json: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], "2.0");
        assert_eq!(json["settings"]["ditheringType"], "bayer2x2");
        assert_eq!(json["settings"]["scaleSize"], 4);
        assert_eq!(json["settings"]["pixelSize"], 5);
        assert_eq!(json["settings"]["doCleanupIsolated"], false);
        assert_eq!(json["settings"]["coordinateMapping"]["isEnabled"], true);
        assert!(json["originalImage"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(json["metadata"]["originalDimensions"]["width"], 4);
        assert_eq!(json["metadata"]["finalDimensions"]["height"], 2);
        assert!(json["metadata"]["timestamp"].is_string());
    }

    #[test]
    fn test_reload_preserves_settings_and_images() {
        let project = sample_project();
        let loaded = Project::from_json(&project.to_json().unwrap()).unwrap();
        assert_eq!(loaded.settings, project.settings);
        assert_eq!(loaded.original().unwrap(), project.original().unwrap());
        assert_eq!(loaded.grid().unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn test_malformed_json_is_corrupt() {
        assert!(matches!(
            Project::from_json("{ not json"),
            Err(PixelrickError::CorruptProjectFile(_))
        ));
        assert!(matches!(
            Project::from_json(r#"{"version": "2.0"}"#),
            Err(PixelrickError::CorruptProjectFile(_))
        ));
    }

    #[test]
    fn test_minimal_legacy_settings_use_defaults() {
        let project = sample_project();
        let json = format!(
            r#"{{
                "version": "1.0",
                "settings": {{"rgbWeights": {{"r": 0.3, "g": 0.59, "b": 0.11}}, "brightness": 0,
                              "contrast": 1, "doCleanupIsolated": true, "edgeEnhancement": 0,
                              "scaleSize": 32}},
                "originalImage": "{}",
                "processedGrid": "{}",
                "metadata": {{"timestamp": "2024-05-01T12:00:00.000Z",
                              "originalDimensions": {{"width": 4, "height": 2}},
                              "finalDimensions": {{"width": 4, "height": 2}}}}
            }}"#,
            project.original_image, project.processed_grid
        );
        let loaded = Project::from_json(&json).unwrap();
        assert!(loaded.settings.options.cleanup_isolated);
        assert_eq!(loaded.settings.options.jpeg_passes, 1);
        assert_eq!(loaded.settings.scale_size, Some(32));
        assert_eq!(loaded.settings.target_size, None);
        assert!(loaded.settings.coordinate_mapping.is_none());
    }

    #[test]
    fn test_bad_data_url_is_corrupt() {
        assert!(matches!(
            decode_data_url("http://example.com/a.png"),
            Err(PixelrickError::CorruptProjectFile(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(PixelrickError::CorruptProjectFile(_))
        ));
    }

    #[test]
    fn test_legacy_grid_migration() {
        let mut image = RgbaImage::new(3, 1);
        let [r, g, b] = LEGACY_PALETTE[6];
        image.put_pixel(0, 0, Rgba([r, g, b, 255]));
        let [r, g, b] = LEGACY_PALETTE[12];
        image.put_pixel(1, 0, Rgba([r, g, b, 0]));
        image.put_pixel(2, 0, Rgba([1, 2, 3, 255]));

        let grid = migrate_legacy_grid(image);
        let [r, g, b] = PALETTE[6];
        assert_eq!(grid.pixel(0, 0), Some(Rgba([r, g, b, 255])));
        let [r, g, b] = PALETTE[12];
        assert_eq!(grid.pixel(1, 0), Some(Rgba([r, g, b, 0])));
        assert_eq!(grid.pixel(2, 0), Some(Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.pxlrck");
        let project = sample_project();
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded.metadata, project.metadata);
    }

    #[test]
    fn test_restore_into_pipeline() {
        let project = sample_project();
        let mut pipeline = Pipeline::default();
        project.restore_into(&mut pipeline).unwrap();
        assert_eq!(pipeline.options().brightness, -10);
        assert_eq!(pipeline.options().dithering_type, DitherType::Bayer2x2);
        assert_eq!(pipeline.grid().unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn test_from_pipeline_requires_grid() {
        let pipeline = Pipeline::default();
        assert!(matches!(Project::from_pipeline(&pipeline), Err(PixelrickError::NoSource)));
    }
}
