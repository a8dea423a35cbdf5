//! YAML configuration for the camera-info report.
//!
//! Every key is optional so a file can hold just the dataset layout while the
//! remaining values come from the command line or the environment:
//!
//! ```yaml
//! images_dir: /data/family/images
//! intrinsics_file: /data/family/sparse/0/cam_intrinsics.txt
//! extrinsics_file: /data/family/sparse/0/cam_extrinsics.txt
//! output_dir: /data/family/sparse/0
//! strict_extrinsics: true
//! write_json: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::{CameraError, ExtrinsicsPolicy};
use crate::report::ReportConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub images_dir: Option<PathBuf>,
    pub intrinsics_file: Option<PathBuf>,
    pub extrinsics_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub strict_extrinsics: Option<bool>,
    pub write_json: Option<bool>,
}

impl ConfigFile {
    pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Fills every unset field of `self` from `fallback`.
    pub fn or(self, fallback: ConfigFile) -> ConfigFile {
        ConfigFile {
            images_dir: self.images_dir.or(fallback.images_dir),
            intrinsics_file: self.intrinsics_file.or(fallback.intrinsics_file),
            extrinsics_file: self.extrinsics_file.or(fallback.extrinsics_file),
            output_dir: self.output_dir.or(fallback.output_dir),
            strict_extrinsics: self.strict_extrinsics.or(fallback.strict_extrinsics),
            write_json: self.write_json.or(fallback.write_json),
        }
    }

    /// Builds a [`ReportConfig`], failing on the first missing path.
    pub fn into_report_config(self) -> Result<ReportConfig, CameraError> {
        fn required(value: Option<PathBuf>, key: &str) -> Result<PathBuf, CameraError> {
            value.ok_or_else(|| CameraError::InvalidParams(format!("Missing '{key}'")))
        }

        let mut config = ReportConfig::new(
            required(self.images_dir, "images_dir")?,
            required(self.intrinsics_file, "intrinsics_file")?,
            required(self.extrinsics_file, "extrinsics_file")?,
            required(self.output_dir, "output_dir")?,
        );
        if self.strict_extrinsics.unwrap_or(false) {
            config.extrinsics_policy = ExtrinsicsPolicy::Strict;
        }
        config.write_json = self.write_json.unwrap_or(false);
        Ok(config)
    }
}
