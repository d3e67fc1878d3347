//! Error types for the pixel-art pipeline

use thiserror::Error;

/// Errors produced by the processing pipeline and its file formats.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PixelrickError {
    /// Source bytes are not a PNG or JPEG image
    #[error("unsupported input format: {0} (expected PNG or JPEG)")]
    InvalidInputFormat(String),
    /// Requested target size is outside the allowed range or not a number
    #[error("invalid target size '{0}': expected a whole number between 8 and 1024")]
    InvalidScaleTarget(String),
    /// A scaling dimension of zero was requested
    #[error("invalid dimension {0}: must be a positive integer")]
    InvalidDimension(u32),
    /// Processing options contain out-of-range values
    #[error("invalid processing options:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    InvalidOptions(Vec<String>),
    /// Project file could not be parsed or is missing required data
    #[error("corrupt project file: {0}")]
    CorruptProjectFile(String),
    /// An operation needs a loaded source image
    #[error("no source image loaded")]
    NoSource,
    /// Image encode/decode failure
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PixelrickError>;
