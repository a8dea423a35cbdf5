//! Parser for the per-camera pose dump.
//!
//! Every camera block starts with a `Camera <id>` marker line and is followed
//! by the rows of a 3×4 `[R | t]` matrix as printed by a tensor library:
//!
//! ```text
//! Camera 0 extrinsics:
//! tensor([[ 0.9998, -0.0123,  0.0150,  0.1000],
//!         [ 0.0120,  0.9998,  0.0200, -0.2000],
//!         [-0.0152, -0.0198,  0.9997,  1.5000]])
//! ```
//!
//! The first row is embedded in the `tensor([` wrapper line, the following
//! rows start with `[`. A block is committed only when exactly three rows of
//! four numbers were collected; what happens to other blocks is decided by
//! the [`ExtrinsicsPolicy`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use nalgebra::{Matrix3, Matrix3x4, Vector3};

use super::intrinsics::parse_camera_id;
use super::CameraError;

const CAMERA_MARKER: &str = "Camera";
const TENSOR_PREFIX: &str = "tensor([";
const ROWS_PER_BLOCK: usize = 3;
const VALUES_PER_ROW: usize = 4;

/// A camera pose: 3×3 rotation concatenated with a 3×1 translation column.
pub type PoseMatrix = Matrix3x4<f64>;

/// How to treat a camera block that does not hold exactly three rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtrinsicsPolicy {
    /// Drop the block and log a warning.
    #[default]
    Lenient,
    /// Abort the parse with [`CameraError::IncompleteBlock`].
    Strict,
}

/// Pose matrix per camera id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtrinsicsTable {
    poses: BTreeMap<u32, PoseMatrix>,
}

impl ExtrinsicsTable {
    pub fn pose(&self, id: u32) -> Option<&PoseMatrix> {
        self.poses.get(&id)
    }

    pub fn insert(&mut self, id: u32, pose: PoseMatrix) {
        self.poses.insert(id, pose);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.poses.keys().copied()
    }
}

/// Rotation part of a pose (first three columns).
pub fn rotation(pose: &PoseMatrix) -> Matrix3<f64> {
    pose.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Translation part of a pose (last column).
pub fn translation(pose: &PoseMatrix) -> Vector3<f64> {
    pose.column(3).into_owned()
}

/// Strips bracket, parenthesis and comma decoration from a row and parses
/// the remaining whitespace-separated numbers. Anything after the row's
/// closing bracket (e.g. `, device='cuda:0')`) is ignored.
fn parse_row(text: &str, line_number: usize) -> Result<Vec<f64>, CameraError> {
    let text = text.trim().trim_start_matches(['[', '(']);
    let text = match text.find(']') {
        Some(end) => &text[..end],
        None => text,
    };
    text.replace([',', '(', ')'], " ")
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|e| CameraError::Parse {
                line: line_number,
                message: format!("invalid matrix value '{token}': {e}"),
            })
        })
        .collect()
}

struct BlockBuilder {
    id: u32,
    rows: Vec<[f64; VALUES_PER_ROW]>,
}

impl BlockBuilder {
    fn push_row(&mut self, row: &[f64]) {
        if row.len() != VALUES_PER_ROW || self.rows.len() >= ROWS_PER_BLOCK {
            debug!(
                "Camera {}: ignoring row with {} values ({} rows collected)",
                self.id,
                row.len(),
                self.rows.len()
            );
            return;
        }
        self.rows.push([row[0], row[1], row[2], row[3]]);
    }

    fn finish(
        self,
        table: &mut ExtrinsicsTable,
        policy: ExtrinsicsPolicy,
    ) -> Result<(), CameraError> {
        if self.rows.len() == ROWS_PER_BLOCK {
            let pose = PoseMatrix::from_fn(|r, c| self.rows[r][c]);
            table.insert(self.id, pose);
            return Ok(());
        }
        match policy {
            ExtrinsicsPolicy::Lenient => {
                warn!(
                    "Dropping camera {}: {} pose rows, expected {}",
                    self.id,
                    self.rows.len(),
                    ROWS_PER_BLOCK
                );
                Ok(())
            }
            ExtrinsicsPolicy::Strict => Err(CameraError::IncompleteBlock {
                id: self.id,
                rows: self.rows.len(),
            }),
        }
    }
}

/// Parses an extrinsics table from an in-memory string.
///
/// # Errors
///
/// * [`CameraError::Parse`] if a marker id or a matrix value is not a number.
/// * [`CameraError::IncompleteBlock`] for a block without exactly three rows,
///   only under [`ExtrinsicsPolicy::Strict`].
pub fn parse_extrinsics_str(
    contents: &str,
    policy: ExtrinsicsPolicy,
) -> Result<ExtrinsicsTable, CameraError> {
    let mut table = ExtrinsicsTable::default();
    let mut current: Option<BlockBuilder> = None;

    for (index, raw_line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.starts_with(CAMERA_MARKER) {
            if let Some(block) = current.take() {
                block.finish(&mut table, policy)?;
            }
            current = Some(BlockBuilder {
                id: parse_camera_id(line, line_number)?,
                rows: Vec::with_capacity(ROWS_PER_BLOCK),
            });
        } else if let Some(start) = line.find(TENSOR_PREFIX) {
            let row = parse_row(&line[start + TENSOR_PREFIX.len()..], line_number)?;
            if let Some(block) = current.as_mut() {
                block.push_row(&row);
            }
        } else if line.starts_with('[') {
            let row = parse_row(line, line_number)?;
            if let Some(block) = current.as_mut() {
                block.push_row(&row);
            }
        }
        // Everything else (lone `]`, `])`, bare `tensor` lines, blanks) is noise.
    }

    if let Some(block) = current {
        block.finish(&mut table, policy)?;
    }

    Ok(table)
}

/// Reads and parses an extrinsics table from `path`.
pub fn parse_extrinsics<P: AsRef<Path>>(
    path: P,
    policy: ExtrinsicsPolicy,
) -> Result<ExtrinsicsTable, CameraError> {
    let contents = fs::read_to_string(path)?;
    parse_extrinsics_str(&contents, policy)
}
