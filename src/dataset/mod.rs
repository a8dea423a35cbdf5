//! Image folder handling for a reconstruction dataset.
//!
//! Provides the sorted [`ImageSet`] consumed by the camera-info report, plus
//! two in-place preparation steps: [`subsample_images`] keeps every n-th frame
//! of a sequence and renumbers it, [`resize_images`] rescales a whole folder.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use log::{error, info};

use crate::camera::{CameraError, Resolution};

/// Extensions accepted for the camera-info report.
pub const REPORT_EXTENSIONS: [&str; 2] = [".jpg", ".png"];
/// Extensions touched by [`resize_images`] (compared in lowercase).
pub const RESIZE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".bmp", ".gif", ".tiff"];
/// Extension of the frame sequence handled by [`subsample_images`].
pub const SEQUENCE_EXTENSION: &str = ".jpg";

/// Image files of a folder, sorted by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
}

impl ImageSet {
    /// Lists the files in `dir` whose name ends with one of `extensions`.
    ///
    /// The match is a case-sensitive suffix check; directories are skipped.
    pub fn from_dir<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Self, CameraError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if extensions.iter().any(|ext| name.ends_with(ext)) {
                names.push(name);
            }
        }
        names.sort();

        Ok(ImageSet {
            paths: names.into_iter().map(|name| dir.as_ref().join(name)).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

/// Reads the width and height of an image from its header.
pub fn image_resolution<P: AsRef<Path>>(path: P) -> Result<Resolution, CameraError> {
    let (width, height) = image::image_dimensions(path.as_ref()).map_err(|e| {
        CameraError::ImageError(format!(
            "Failed to read dimensions of {}: {e}",
            path.as_ref().display()
        ))
    })?;
    Ok(Resolution { width, height })
}

/// Keeps every `step`-th `.jpg` frame of `dir` and renumbers the survivors.
///
/// Frames are sorted by name; indices `0, step, 2*step, ...` are kept, all
/// other frames are deleted, and the kept frames are renamed to
/// `000001.jpg`, `000002.jpg`, ... in order.
///
/// # Returns
///
/// The new paths of the kept frames.
///
/// # Errors
///
/// * [`CameraError::InvalidParams`] if `step` is zero.
/// * [`CameraError::IOError`] if listing, deleting or renaming fails.
pub fn subsample_images<P: AsRef<Path>>(dir: P, step: usize) -> Result<Vec<PathBuf>, CameraError> {
    if step == 0 {
        return Err(CameraError::InvalidParams(
            "Subsampling step must be at least 1".to_string(),
        ));
    }
    let dir = dir.as_ref();
    let images = ImageSet::from_dir(dir, &[SEQUENCE_EXTENSION])?;

    let mut kept = Vec::new();
    for (index, path) in images.iter().enumerate() {
        if index % step == 0 {
            kept.push(path.clone());
        } else {
            fs::remove_file(path)?;
        }
    }

    // Two passes so a new name never clobbers a kept frame that still has to
    // be renamed (e.g. `000003.jpg` becoming `000002.jpg`).
    let mut staged = Vec::with_capacity(kept.len());
    for (index, path) in kept.iter().enumerate() {
        let tmp = dir.join(format!(".subsample-{index:06}.tmp"));
        fs::rename(path, &tmp)?;
        staged.push((path, tmp));
    }

    let mut renamed = Vec::with_capacity(staged.len());
    for (index, (original, tmp)) in staged.into_iter().enumerate() {
        let target = dir.join(format!("{:06}{SEQUENCE_EXTENSION}", index + 1));
        fs::rename(&tmp, &target)?;
        info!(
            "Renamed {} to {}",
            file_name(original),
            file_name(&target)
        );
        renamed.push(target);
    }

    Ok(renamed)
}

/// Outcome of a [`resize_images`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSummary {
    pub resized: usize,
    pub failed: usize,
}

/// Resizes every image in `dir` to exactly `target`, overwriting the files.
///
/// Files are selected by a lowercase extension check against
/// [`RESIZE_EXTENSIONS`]. A file that cannot be decoded or saved is logged
/// and counted as failed; it does not stop the batch.
pub fn resize_images<P: AsRef<Path>>(
    dir: P,
    target: Resolution,
) -> Result<ResizeSummary, CameraError> {
    if target.width == 0 || target.height == 0 {
        return Err(CameraError::InvalidParams(format!(
            "Target size must be non-zero, got {}x{}",
            target.width, target.height
        )));
    }

    let mut summary = ResizeSummary::default();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() || !has_resize_extension(&path) {
            continue;
        }
        match resize_one(&path, target) {
            Ok(()) => {
                info!("Resized: {}", file_name(&path));
                summary.resized += 1;
            }
            Err(e) => {
                error!("Error resizing {}: {e}", file_name(&path));
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn resize_one(path: &Path, target: Resolution) -> Result<(), CameraError> {
    let img = image::open(path)?;
    let resized = img.resize_exact(target.width, target.height, FilterType::Lanczos3);
    resized.save(path)?;
    Ok(())
}

fn has_resize_extension(path: &Path) -> bool {
    let name = file_name(path).to_lowercase();
    RESIZE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
        RgbImage::new(width, height).save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_image_set_is_sorted_and_filtered() {
        let tmp_dir = tempfile::tempdir().unwrap();
        write_image(tmp_dir.path(), "b.png", 4, 4);
        write_image(tmp_dir.path(), "a.jpg", 4, 4);
        write_image(tmp_dir.path(), "c.JPG", 4, 4);
        fs::write(tmp_dir.path().join("notes.txt"), "not an image").unwrap();
        fs::create_dir(tmp_dir.path().join("d.png")).unwrap();

        let images = ImageSet::from_dir(tmp_dir.path(), &REPORT_EXTENSIONS).unwrap();
        let names: Vec<String> = images.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_image_resolution() {
        let tmp_dir = tempfile::tempdir().unwrap();
        write_image(tmp_dir.path(), "frame.png", 64, 48);

        let resolution = image_resolution(tmp_dir.path().join("frame.png")).unwrap();
        assert_eq!(
            resolution,
            Resolution {
                width: 64,
                height: 48
            }
        );
    }

    #[test]
    fn test_image_resolution_of_non_image_fails() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let path = tmp_dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(
            image_resolution(&path),
            Err(CameraError::ImageError(_))
        ));
    }

    #[test]
    fn test_subsample_keeps_every_second_frame() {
        let tmp_dir = tempfile::tempdir().unwrap();
        for (i, width) in [10, 11, 12, 13, 14].iter().enumerate() {
            write_image(tmp_dir.path(), &format!("frame_{i:03}.jpg"), *width, 8);
        }
        write_image(tmp_dir.path(), "keep_me.png", 8, 8);

        let kept = subsample_images(tmp_dir.path(), 2).unwrap();

        let names: Vec<String> = kept.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["000001.jpg", "000002.jpg", "000003.jpg"]);
        let widths: Vec<u32> = kept
            .iter()
            .map(|p| image_resolution(p).unwrap().width)
            .collect();
        assert_eq!(widths, vec![10, 12, 14]);

        let remaining = ImageSet::from_dir(tmp_dir.path(), &REPORT_EXTENSIONS).unwrap();
        assert_eq!(remaining.len(), 4);
    }

    #[test]
    fn test_subsample_renumbering_does_not_clobber() {
        let tmp_dir = tempfile::tempdir().unwrap();
        for (i, width) in [20, 21, 22].iter().enumerate() {
            write_image(tmp_dir.path(), &format!("{:06}.jpg", i + 1), *width, 8);
        }

        let kept = subsample_images(tmp_dir.path(), 1).unwrap();
        let widths: Vec<u32> = kept
            .iter()
            .map(|p| image_resolution(p).unwrap().width)
            .collect();
        assert_eq!(widths, vec![20, 21, 22]);
    }

    #[test]
    fn test_subsample_rejects_zero_step() {
        let tmp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            subsample_images(tmp_dir.path(), 0),
            Err(CameraError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_resize_images_in_place() {
        let tmp_dir = tempfile::tempdir().unwrap();
        write_image(tmp_dir.path(), "a.png", 100, 50);
        write_image(tmp_dir.path(), "b.JPG", 30, 90);
        fs::write(tmp_dir.path().join("corrupt.jpg"), b"garbage").unwrap();
        fs::write(tmp_dir.path().join("readme.txt"), b"skip").unwrap();

        let target = Resolution {
            width: 32,
            height: 17,
        };
        let summary = resize_images(tmp_dir.path(), target).unwrap();

        assert_eq!(
            summary,
            ResizeSummary {
                resized: 2,
                failed: 1
            }
        );
        assert_eq!(image_resolution(tmp_dir.path().join("a.png")).unwrap(), target);
        assert_eq!(image_resolution(tmp_dir.path().join("b.JPG")).unwrap(), target);
    }
}
