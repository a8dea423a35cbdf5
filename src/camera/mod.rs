//! Camera parameters consumed by the camera-info report.
//!
//! This module holds the error type shared by the whole crate, the
//! [`Resolution`] of an image and the field-of-view computation. The two text
//! parsers for the per-camera focal lengths and poses live in the
//! [`intrinsics`] and [`extrinsics`] submodules.

use serde::{Deserialize, Serialize};

pub mod extrinsics;
pub mod intrinsics;

pub use extrinsics::{ExtrinsicsPolicy, ExtrinsicsTable, PoseMatrix};
pub use intrinsics::IntrinsicsTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error(
        "Mismatch between the number of images ({images}) and camera data \
         (intrinsics: {intrinsics}, extrinsics: {extrinsics})"
    )]
    CountMismatch {
        images: usize,
        intrinsics: usize,
        extrinsics: usize,
    },
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Camera {id} has {rows} pose rows, expected 3")]
    IncompleteBlock { id: u32, rows: usize },
    #[error("Camera {index} is missing from the {table} table")]
    MissingCamera { table: &'static str, index: u32 },
    #[error("Focal length must be positive")]
    FocalLengthMustBePositive,
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Image error: {0}")]
    ImageError(String),
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("Failed to write JSON: {0}")]
    JsonError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::IOError(err.to_string())
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::ImageError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CameraError {
    fn from(err: serde_yaml::Error) -> Self {
        CameraError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        CameraError::JsonError(err.to_string())
    }
}

/// Computes the angular field of view for one image axis.
///
/// `fov = 2 * atan(dimension / (2 * focal_length))`, in radians. The focal
/// length and the dimension must share units (pixels). No special casing is
/// applied: a zero focal length follows IEEE-754 and yields `±π` (or NaN when
/// the dimension is zero too).
///
/// # Examples
///
/// ```rust
/// use camera_info_tools::camera::calculate_fov;
///
/// let fov = calculate_fov(500.0, 1000.0);
/// assert!((fov - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn calculate_fov(focal_length: f64, dimension: f64) -> f64 {
    2.0 * (dimension / (2.0 * focal_length)).atan()
}

/// Horizontal and vertical field of view of a camera, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub fov_x: f64,
    pub fov_y: f64,
}

impl FieldOfView {
    /// Builds both angles from a single focal length and an image resolution.
    pub fn from_focal_length(focal_length: f64, resolution: &Resolution) -> Self {
        FieldOfView {
            fov_x: calculate_fov(focal_length, resolution.width as f64),
            fov_y: calculate_fov(focal_length, resolution.height as f64),
        }
    }
}

/// Common validation functions for camera parameters
pub mod validation {
    use super::*;

    pub fn validate_focal_length(focal_length: f64) -> Result<(), CameraError> {
        if !focal_length.is_finite() || focal_length <= 0.0 {
            return Err(CameraError::FocalLengthMustBePositive);
        }
        Ok(())
    }
}
