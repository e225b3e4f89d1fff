// Re-export glam for convenience
pub use glam::*;

// POD math helpers
mod transform;
pub use transform::{matrix_from_pod, Mat4Ext, POD_MATRIX_FLOATS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_quat_identity_rotation() {
        let q = Quat::from_xyzw(0.0, 0.0, 0.0, 1.0);
        assert_eq!(q * Vec3::X, Vec3::X);
    }
}
