//! Camera-info report generation.
//!
//! Combines the focal length table, the pose dump and the image folder into
//! one text file, `cam_infos_created.txt`, holding one block per camera. The
//! three inputs are matched by position: the `i`-th image (in file name order)
//! uses camera id `i` from both tables.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::camera::extrinsics::{self, parse_extrinsics};
use crate::camera::intrinsics::parse_intrinsics;
use crate::camera::{validation, CameraError, ExtrinsicsPolicy, FieldOfView, Resolution};
use crate::dataset::{file_name, image_resolution, ImageSet, REPORT_EXTENSIONS};

pub const REPORT_FILE_NAME: &str = "cam_infos_created.txt";
pub const JSON_FILE_NAME: &str = "cam_infos_created.json";

const SEPARATOR_WIDTH: usize = 50;

/// Locations and options for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub images_dir: PathBuf,
    pub intrinsics_file: PathBuf,
    pub extrinsics_file: PathBuf,
    pub output_dir: PathBuf,
    pub extrinsics_policy: ExtrinsicsPolicy,
    /// Also write the records as a JSON array next to the text report.
    pub write_json: bool,
}

impl ReportConfig {
    pub fn new(
        images_dir: impl Into<PathBuf>,
        intrinsics_file: impl Into<PathBuf>,
        extrinsics_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        ReportConfig {
            images_dir: images_dir.into(),
            intrinsics_file: intrinsics_file.into(),
            extrinsics_file: extrinsics_file.into(),
            output_dir: output_dir.into(),
            extrinsics_policy: ExtrinsicsPolicy::default(),
            write_json: false,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}

/// Everything the report states about one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfoRecord {
    pub uid: u32,
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    pub fov: FieldOfView,
    pub image_path: PathBuf,
    pub image_name: String,
    pub resolution: Resolution,
}

impl CameraInfoRecord {
    /// Writes the fixed-format text block for this camera.
    pub fn write_block<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Camera {} Info:", self.uid)?;
        writeln!(out, "UID: {}", self.uid)?;
        writeln!(out, "Rotation Matrix (R):")?;
        for r in 0..3 {
            writeln!(
                out,
                "[{:.8} {:.8} {:.8}]",
                self.rotation[(r, 0)],
                self.rotation[(r, 1)],
                self.rotation[(r, 2)]
            )?;
        }
        writeln!(
            out,
            "Translation Vector (T): [{:.8} {:.8} {:.8}]",
            self.translation.x, self.translation.y, self.translation.z
        )?;
        writeln!(out, "FOVY: {:.10}", self.fov.fov_y)?;
        writeln!(out, "FOVX: {:.10}", self.fov.fov_x)?;
        writeln!(out, "Image Path: {}", self.image_path.display())?;
        writeln!(out, "Image Name: {}", self.image_name)?;
        writeln!(out, "Width: {}", self.resolution.width)?;
        writeln!(out, "Height: {}", self.resolution.height)?;
        write!(out, "\n{}\n\n", "-".repeat(SEPARATOR_WIDTH))
    }
}

fn build_record(
    uid: u32,
    image_path: &Path,
    focal_length: f64,
    pose: &extrinsics::PoseMatrix,
) -> Result<CameraInfoRecord, CameraError> {
    validation::validate_focal_length(focal_length)?;
    let resolution = image_resolution(image_path)?;

    Ok(CameraInfoRecord {
        uid,
        rotation: extrinsics::rotation(pose),
        translation: extrinsics::translation(pose),
        fov: FieldOfView::from_focal_length(focal_length, &resolution),
        image_path: image_path.to_path_buf(),
        image_name: file_name(image_path),
        resolution,
    })
}

/// Generates `cam_infos_created.txt` in `config.output_dir`.
///
/// The counts of images, focal lengths and poses are checked before the
/// output file is created; the file is then truncated and written block by
/// block. A failure in the middle of the loop leaves a partial file behind.
///
/// # Returns
///
/// The path of the written text report.
///
/// # Errors
///
/// * [`CameraError::CountMismatch`] if the three inputs differ in size.
/// * [`CameraError::MissingCamera`] if camera id `i` is absent from a table.
/// * [`CameraError::FocalLengthMustBePositive`] for a zero, negative or
///   non-finite focal length.
/// * Any parse, image or I/O error from reading the inputs.
pub fn generate_camera_info(config: &ReportConfig) -> Result<PathBuf, CameraError> {
    let intrinsics = parse_intrinsics(&config.intrinsics_file)?;
    let extrinsics = parse_extrinsics(&config.extrinsics_file, config.extrinsics_policy)?;
    let images = ImageSet::from_dir(&config.images_dir, &REPORT_EXTENSIONS)?;

    if images.len() != intrinsics.len() || images.len() != extrinsics.len() {
        return Err(CameraError::CountMismatch {
            images: images.len(),
            intrinsics: intrinsics.len(),
            extrinsics: extrinsics.len(),
        });
    }
    info!(
        "Found {} images with matching intrinsics and extrinsics",
        images.len()
    );

    fs::create_dir_all(&config.output_dir)?;
    let report_path = config.report_path();
    let mut out = BufWriter::new(File::create(&report_path)?);
    let mut records = Vec::with_capacity(images.len());

    for (index, image_path) in images.iter().enumerate() {
        let uid = u32::try_from(index)
            .map_err(|_| CameraError::InvalidParams(format!("Too many images: {index}")))?;
        let focal_length = intrinsics
            .focal_length(uid)
            .ok_or(CameraError::MissingCamera {
                table: "intrinsics",
                index: uid,
            })?;
        let pose = extrinsics.pose(uid).ok_or(CameraError::MissingCamera {
            table: "extrinsics",
            index: uid,
        })?;

        let record = build_record(uid, image_path, focal_length, pose)?;
        record.write_block(&mut out)?;
        info!(
            "Camera {uid}: {} ({}x{})",
            record.image_name, record.resolution.width, record.resolution.height
        );
        if config.write_json {
            records.push(record);
        }
    }
    out.flush()?;

    if config.write_json {
        let json_path = config.output_dir.join(JSON_FILE_NAME);
        let file = BufWriter::new(File::create(&json_path)?);
        serde_json::to_writer_pretty(file, &records)?;
        info!("Wrote {}", json_path.display());
    }

    info!("Wrote {}", report_path.display());
    Ok(report_path)
}
