//! Parser for the per-camera focal length table.
//!
//! The table is a plain text dump where every relevant line starts with the
//! `Camera` marker, followed by the integer camera id and, after the first
//! colon, the focal length in pixels:
//!
//! ```text
//! Camera 0 focal length: 1111.5
//! Camera 1 focal length: 1098.25
//! ```
//!
//! Any other line is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;

use super::CameraError;

const CAMERA_MARKER: &str = "Camera";

/// Focal length per camera id. Ids are whatever integers appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntrinsicsTable {
    focal_lengths: BTreeMap<u32, f64>,
}

impl IntrinsicsTable {
    pub fn focal_length(&self, id: u32) -> Option<f64> {
        self.focal_lengths.get(&id).copied()
    }

    pub fn insert(&mut self, id: u32, focal_length: f64) {
        self.focal_lengths.insert(id, focal_length);
    }

    pub fn len(&self) -> usize {
        self.focal_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.focal_lengths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.focal_lengths.iter().map(|(id, f)| (*id, *f))
    }
}

/// Parses the camera id from the second whitespace token of a marker line.
///
/// Shared with the extrinsics parser, which uses the same marker lines.
pub(crate) fn parse_camera_id(line: &str, line_number: usize) -> Result<u32, CameraError> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| CameraError::Parse {
            line: line_number,
            message: "missing camera id after marker".to_string(),
        })?;
    token
        .trim_end_matches(':')
        .parse::<u32>()
        .map_err(|e| CameraError::Parse {
            line: line_number,
            message: format!("invalid camera id '{token}': {e}"),
        })
}

/// Parses an intrinsics table from an in-memory string.
///
/// # Errors
///
/// * [`CameraError::Parse`] if a `Camera` line has no colon, or its id or
///   focal length cannot be converted to a number.
pub fn parse_intrinsics_str(contents: &str) -> Result<IntrinsicsTable, CameraError> {
    let mut table = IntrinsicsTable::default();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if !line.starts_with(CAMERA_MARKER) {
            continue;
        }

        let id = parse_camera_id(line, line_number)?;
        let value = line.split(':').nth(1).ok_or_else(|| CameraError::Parse {
            line: line_number,
            message: "missing ':' before focal length".to_string(),
        })?;
        let value = value.trim();
        let focal_length = value.parse::<f64>().map_err(|e| CameraError::Parse {
            line: line_number,
            message: format!("invalid focal length '{value}': {e}"),
        })?;

        debug!("Camera {id}: focal length {focal_length}");
        table.insert(id, focal_length);
    }

    Ok(table)
}

/// Reads and parses an intrinsics table from `path`.
pub fn parse_intrinsics<P: AsRef<Path>>(path: P) -> Result<IntrinsicsTable, CameraError> {
    let contents = fs::read_to_string(path)?;
    parse_intrinsics_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intrinsics_from_file() {
        let table = parse_intrinsics("samples/cam_intrinsics.txt").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.focal_length(0), Some(1111.5));
        assert_eq!(table.focal_length(1), Some(1098.25));
        assert_eq!(table.focal_length(2), Some(1105.0));
        assert_eq!(table.focal_length(3), None);
    }

    #[test]
    fn test_non_marker_lines_are_ignored() {
        let contents = "\
# header: not a camera line
  Camera 7 indented lines do not start with the marker: 1.0
Camera 4 focal: 320.5

Camera 9 focal: 640
";
        let table = parse_intrinsics_str(contents).unwrap();
        let entries: Vec<(u32, f64)> = table.iter().collect();
        assert_eq!(entries, vec![(4, 320.5), (9, 640.0)]);
    }

    #[test]
    fn test_invalid_focal_length_is_an_error() {
        let contents = "Camera 0 focal: 500.0\nCamera 1 focal: five hundred\n";
        let err = parse_intrinsics_str(contents).unwrap_err();
        assert!(matches!(err, CameraError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_colon_is_an_error() {
        let err = parse_intrinsics_str("Camera 0 500.0\n").unwrap_err();
        assert!(matches!(err, CameraError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_invalid_id_is_an_error() {
        let err = parse_intrinsics_str("Camera x focal: 500.0\n").unwrap_err();
        assert!(matches!(err, CameraError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_intrinsics("samples/does_not_exist.txt").unwrap_err();
        assert!(matches!(err, CameraError::IOError(_)));
    }
}
