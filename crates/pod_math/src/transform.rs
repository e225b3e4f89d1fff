// Transform utilities for Mat4
//
// POD files store matrices as 16 consecutive floats in column-major order,
// which is also glam's layout.

use glam::{Mat4, Vec3, Vec4};

/// Number of floats in a serialized POD matrix.
pub const POD_MATRIX_FLOATS: usize = 16;

/// Build a matrix from the first 16 floats of a POD float run.
///
/// Returns `None` when fewer than 16 values are available.
pub fn matrix_from_pod(values: &[f32]) -> Option<Mat4> {
    if values.len() < POD_MATRIX_FLOATS {
        return None;
    }
    Some(Mat4::from_cols_slice(&values[..POD_MATRIX_FLOATS]))
}

/// Extension trait for Mat4 used when projecting node transforms onto lights
/// and cameras.
pub trait Mat4Ext {
    /// The translation part of an affine matrix.
    fn position(&self) -> Vec3;

    /// Transform a direction (w=0) and normalize the result.
    ///
    /// Returns `Vec3::ZERO` when the transformed vector is degenerate.
    fn transform_direction(&self, direction: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn position(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn transform_direction(&self, direction: Vec3) -> Vec3 {
        // Translation must not affect directions
        let v4 = Vec4::new(direction.x, direction.y, direction.z, 0.0);
        let transformed = (*self * v4).truncate();
        transformed.normalize_or_zero()
    }
}
