/// 4x4 transformation matrices and rotation state
///
/// Matrices are nalgebra `Matrix4<f32>`, stored column-major. Rotations are
/// right-handed and take radians.
use nalgebra::{Matrix4, Vector4};

use crate::vector::Vector3;

pub type Mat4 = Matrix4<f32>;
pub type Vec4 = Vector4<f32>;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn matrix(&self) -> Mat4 {
        Transform::rotation_xyz(self.x, self.y, self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Matrix constructors and composition.
///
/// `Matrix4::new` takes its arguments row by row; storage stays column-major.
pub struct Transform;

impl Transform {
    pub fn identity() -> Mat4 {
        Mat4::identity()
    }

    #[rustfmt::skip]
    pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
        Mat4::new(
            1.0, 0.0, 0.0, tx,
            0.0, 1.0, 0.0, ty,
            0.0, 0.0, 1.0, tz,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
        Mat4::new(
            sx, 0.0, 0.0, 0.0,
            0.0, sy, 0.0, 0.0,
            0.0, 0.0, sz, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Combined rotation `Rz * Ry * Rx`: a point is rotated about X first,
    /// then Y, then Z.
    pub fn rotation_xyz(rx: f32, ry: f32, rz: f32) -> Mat4 {
        Self::rotation_z(rz) * Self::rotation_y(ry) * Self::rotation_x(rx)
    }

    /// Asymmetric frustum projection with the OpenGL clip convention.
    ///
    /// Clip `w` becomes the eye-space distance in front of the camera
    /// (`-z_eye`), so points behind the eye end up with `w <= 0`.
    #[rustfmt::skip]
    pub fn perspective(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
        Mat4::new(
            2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
            0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
            0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Column-major product `a * b` (`b` is applied first).
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        a * b
    }

    /// Apply `m` to a homogeneous vector. No perspective divide.
    pub fn multiply_vec4(m: &Mat4, v: &Vec4) -> Vec4 {
        m * v
    }

    /// Apply `m` to a point (w = 1), dividing by the resulting w unless it is ~0.
    pub fn transform_point(m: &Mat4, point: &Vector3) -> Vector3 {
        let [x, y, z] = point.cartesian();
        let out = m * Vec4::new(x, y, z, 1.0);
        if out.w.abs() > crate::vector::EPSILON {
            Vector3::from_cartesian(out.x / out.w, out.y / out.w, out.z / out.w)
        } else {
            Vector3::from_cartesian(out.x, out.y, out.z)
        }
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn sample_matrix() -> Mat4 {
        Transform::translation(1.0, -2.0, 3.5)
            * Transform::rotation_xyz(0.3, -1.1, 2.0)
            * Transform::scale(2.0, 0.5, 1.5)
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = RotationState::zero().matrix();
        assert!((matrix - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_multiply_identity() {
        let m = sample_matrix();
        let id = Transform::identity();
        assert_eq!(Transform::multiply(&m, &id), m);
        assert_eq!(Transform::multiply(&id, &m), m);
    }

    #[test]
    fn test_column_major_layout() {
        let t = Transform::translation(4.0, 5.0, 6.0);
        assert_eq!(&t.as_slice()[12..15], &[4.0, 5.0, 6.0]);

        let p = Transform::perspective(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        assert_eq!(p.as_slice()[11], -1.0);
        assert_eq!(p.as_slice()[15], 0.0);
    }

    #[test]
    fn test_translate_round_trip() {
        let p = Vector3::from_cartesian(0.5, -3.0, 8.0);
        let forward = Transform::translation(2.0, 7.0, -1.5);
        let back = Transform::translation(-2.0, -7.0, 1.5);
        let moved = Transform::transform_point(&forward, &p);
        assert!(moved.approx_eq(&Vector3::from_cartesian(2.5, 4.0, 6.5), 1e-6));
        assert!(Transform::transform_point(&back, &moved).approx_eq(&p, 1e-5));
    }

    #[test]
    fn test_right_handed_axis_rotations() {
        let x = Vector3::from_cartesian(1.0, 0.0, 0.0);
        let y = Vector3::from_cartesian(0.0, 1.0, 0.0);
        let z = Vector3::from_cartesian(0.0, 0.0, 1.0);

        let rz = Transform::transform_point(&Transform::rotation_z(FRAC_PI_2), &x);
        assert!(rz.approx_eq(&y, 1e-6));
        let rx = Transform::transform_point(&Transform::rotation_x(FRAC_PI_2), &y);
        assert!(rx.approx_eq(&z, 1e-6));
        let ry = Transform::transform_point(&Transform::rotation_y(FRAC_PI_2), &z);
        assert!(ry.approx_eq(&x, 1e-6));
    }

    #[test]
    fn test_rotation_xyz_applies_x_first() {
        // X by 90 takes +Y to +Z, then Z by 90 leaves +Z alone.
        let m = Transform::rotation_xyz(FRAC_PI_2, 0.0, FRAC_PI_2);
        let p = Transform::transform_point(&m, &Vector3::from_cartesian(0.0, 1.0, 0.0));
        assert!(p.approx_eq(&Vector3::from_cartesian(0.0, 0.0, 1.0), 1e-6));

        let composed = Transform::rotation_z(0.4) * Transform::rotation_y(-0.7) * Transform::rotation_x(1.3);
        assert!((Transform::rotation_xyz(1.3, -0.7, 0.4) - composed).norm() < 1e-6);
    }

    #[test]
    fn test_multiply_vec4_keeps_w() {
        let p = Transform::perspective(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        let clip = Transform::multiply_vec4(&p, &Vec4::new(0.0, 0.0, -2.0, 1.0));
        assert!((clip.w - 2.0).abs() < 1e-6);
    }
}
