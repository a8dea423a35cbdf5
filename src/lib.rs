//! Camera Info Tools Library
//!
//! Prepares image datasets and camera-pose metadata for radiance-field and
//! point-cloud renderers. The library provides:
//! - Parsers for per-camera focal length tables and 3×4 pose dumps
//! - Field-of-view computation from focal length and image size
//! - Generation of the `cam_infos_created.txt` camera report
//! - In-place subsampling and resizing of image folders

pub mod camera;
pub mod config;
pub mod dataset;
pub mod report;

// Re-export commonly used types
pub use camera::{
    calculate_fov, CameraError, ExtrinsicsPolicy, ExtrinsicsTable, FieldOfView, IntrinsicsTable,
    PoseMatrix, Resolution,
};

pub use report::{generate_camera_info, CameraInfoRecord, ReportConfig};
