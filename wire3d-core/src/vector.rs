/// 3D vectors with lazily synchronized cartesian and spherical forms
use std::cell::Cell;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Lengths below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Above this cosine two directions are blended linearly instead of along the great circle.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Spherical coordinates: radius, polar angle from +Z, azimuth from +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub r: f32,
    pub theta: f32,
    pub phi: f32,
}

/// How `normalize_with` computes the reciprocal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `1.0 / sqrt(x)`
    #[default]
    Exact,
    /// Bit-trick approximation refined by Newton-Raphson.
    Fast,
}

impl Normalization {
    pub fn inv_sqrt(self, value: f32) -> f32 {
        match self {
            Normalization::Exact => 1.0 / value.sqrt(),
            Normalization::Fast => fast_inv_sqrt(value),
        }
    }
}

fn fast_inv_sqrt(value: f32) -> f32 {
    let half = value * 0.5;
    let mut y = f32::from_bits(0x5f37_59df - (value.to_bits() >> 1));
    // One step leaves ~0.2% relative error, two bring it under 1e-5.
    y *= 1.5 - half * y * y;
    y *= 1.5 - half * y * y;
    y
}

fn cartesian_to_spherical(v: na::Vector3<f32>) -> Spherical {
    let r = v.norm();
    if r < EPSILON {
        return Spherical {
            r,
            theta: 0.0,
            phi: 0.0,
        };
    }

    let theta = (v.z / r).clamp(-1.0, 1.0).acos();
    let mut phi = v.y.atan2(v.x);
    if phi < 0.0 {
        phi += TAU;
    }
    if phi >= TAU {
        phi -= TAU;
    }

    Spherical { r, theta, phi }
}

fn spherical_to_cartesian(s: Spherical) -> na::Vector3<f32> {
    let (sin_theta, cos_theta) = s.theta.sin_cos();
    let (sin_phi, cos_phi) = s.phi.sin_cos();
    na::Vector3::new(
        s.r * sin_theta * cos_phi,
        s.r * sin_theta * sin_phi,
        s.r * cos_theta,
    )
}

/// A 3D vector holding both a cartesian and a spherical form.
///
/// At least one form is valid at any time. Setting one form marks the other
/// stale; reading a stale form converts it once and caches the result, so
/// repeated reads do not recompute. The cache lives in `Cell`s, which keeps
/// accessors on `&self` and makes the type `!Sync`.
#[derive(Clone)]
pub struct Vector3 {
    cartesian: Cell<na::Vector3<f32>>,
    spherical: Cell<Spherical>,
    cartesian_valid: Cell<bool>,
    spherical_valid: Cell<bool>,
}

impl Vector3 {
    pub fn from_cartesian(x: f32, y: f32, z: f32) -> Self {
        Self::from_na(na::Vector3::new(x, y, z))
    }

    pub fn from_spherical(r: f32, theta: f32, phi: f32) -> Self {
        Self {
            cartesian: Cell::new(na::Vector3::zeros()),
            spherical: Cell::new(Spherical { r, theta, phi }),
            cartesian_valid: Cell::new(false),
            spherical_valid: Cell::new(true),
        }
    }

    pub fn zero() -> Self {
        Self::from_cartesian(0.0, 0.0, 0.0)
    }

    /// Wrap an nalgebra vector; the cartesian form is valid.
    pub fn from_na(v: na::Vector3<f32>) -> Self {
        Self {
            cartesian: Cell::new(v),
            spherical: Cell::new(Spherical {
                r: 0.0,
                theta: 0.0,
                phi: 0.0,
            }),
            cartesian_valid: Cell::new(true),
            spherical_valid: Cell::new(false),
        }
    }

    /// The cartesian form as an nalgebra vector.
    pub fn to_na(&self) -> na::Vector3<f32> {
        if !self.cartesian_valid.get() {
            self.cartesian
                .set(spherical_to_cartesian(self.spherical.get()));
            self.cartesian_valid.set(true);
        }
        self.cartesian.get()
    }

    pub fn set_cartesian(&mut self, x: f32, y: f32, z: f32) {
        self.cartesian.set(na::Vector3::new(x, y, z));
        self.cartesian_valid.set(true);
        self.spherical_valid.set(false);
    }

    pub fn set_spherical(&mut self, r: f32, theta: f32, phi: f32) {
        self.spherical.set(Spherical { r, theta, phi });
        self.spherical_valid.set(true);
        self.cartesian_valid.set(false);
    }

    pub fn x(&self) -> f32 {
        self.to_na().x
    }

    pub fn y(&self) -> f32 {
        self.to_na().y
    }

    pub fn z(&self) -> f32 {
        self.to_na().z
    }

    pub fn cartesian(&self) -> [f32; 3] {
        let v = self.to_na();
        [v.x, v.y, v.z]
    }

    pub fn spherical(&self) -> Spherical {
        if !self.spherical_valid.get() {
            self.spherical
                .set(cartesian_to_spherical(self.cartesian.get()));
            self.spherical_valid.set(true);
        }
        self.spherical.get()
    }

    pub fn r(&self) -> f32 {
        self.spherical().r
    }

    pub fn theta(&self) -> f32 {
        self.spherical().theta
    }

    pub fn phi(&self) -> f32 {
        self.spherical().phi
    }

    pub fn is_cartesian_valid(&self) -> bool {
        self.cartesian_valid.get()
    }

    pub fn is_spherical_valid(&self) -> bool {
        self.spherical_valid.get()
    }

    pub fn scale(&self, factor: f32) -> Vector3 {
        Self::from_na(self.to_na() * factor)
    }

    pub fn dot(&self, other: &Vector3) -> f32 {
        self.to_na().dot(&other.to_na())
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Self::from_na(self.to_na().cross(&other.to_na()))
    }

    pub fn length_squared(&self) -> f32 {
        self.to_na().norm_squared()
    }

    pub fn length(&self) -> f32 {
        self.to_na().norm()
    }

    pub fn is_near_zero(&self) -> bool {
        self.length() < EPSILON
    }

    /// `self + (other - self) * t`, without clamping `t`.
    pub fn lerp(&self, other: &Vector3, t: f32) -> Vector3 {
        let a = self.to_na();
        Self::from_na(a + (other.to_na() - a) * t)
    }

    /// Unit vector in the same direction, or zero for a near-zero vector.
    pub fn normalize(&self) -> Vector3 {
        self.normalize_with(Normalization::Exact)
    }

    pub fn normalize_with(&self, mode: Normalization) -> Vector3 {
        let v = self.to_na();
        let len_sq = v.norm_squared();
        if len_sq < EPSILON * EPSILON {
            return Self::zero();
        }
        Self::from_na(v * mode.inv_sqrt(len_sq))
    }

    /// Spherical linear interpolation between two vectors.
    ///
    /// The direction follows the great circle from `self` to `other` and the
    /// length is blended linearly, so unit inputs give a unit result and
    /// `a.slerp(&a, t)` is `a`. Near-zero inputs fall back to `lerp`.
    pub fn slerp(&self, other: &Vector3, t: f32) -> Vector3 {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_na();
        let b = other.to_na();
        let (len_a, len_b) = (a.norm(), b.norm());
        if len_a < EPSILON || len_b < EPSILON {
            return self.lerp(other, t);
        }

        let (an, bn) = (a / len_a, b / len_b);
        let dot = an.dot(&bn).clamp(-1.0, 1.0);

        let direction = if dot > SLERP_LINEAR_THRESHOLD {
            let blended = an + (bn - an) * t;
            blended / blended.norm()
        } else {
            let theta = dot.acos();
            let sin_theta = theta.sin();
            if sin_theta.abs() < EPSILON {
                // Opposite directions: any perpendicular axis is a valid great circle.
                let axis = if an.x.abs() < 0.9 {
                    na::Vector3::new(1.0, 0.0, 0.0)
                } else {
                    na::Vector3::new(0.0, 1.0, 0.0)
                };
                let perpendicular = an.cross(&axis).normalize();
                let (sin_t, cos_t) = (t * PI).sin_cos();
                an * cos_t + perpendicular * sin_t
            } else {
                let w1 = ((1.0 - t) * theta).sin() / sin_theta;
                let w2 = (t * theta).sin() / sin_theta;
                an * w1 + bn * w2
            }
        };

        Self::from_na(direction * (len_a + (len_b - len_a) * t))
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Vector3, tolerance: f32) -> bool {
        let d = self.to_na() - other.to_na();
        d.x.abs() <= tolerance && d.y.abs() <= tolerance && d.z.abs() <= tolerance
    }
}

/// Point on a cubic Bézier curve; `t` is clamped to [0, 1].
pub fn bezier_cubic(p0: &Vector3, p1: &Vector3, p2: &Vector3, p3: &Vector3, t: f32) -> Vector3 {
    let t = t.clamp(0.0, 1.0);
    let u = 1.0 - t;

    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;

    Vector3::from_na(p0.to_na() * b0 + p1.to_na() * b1 + p2.to_na() * b2 + p3.to_na() * b3)
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Self) -> bool {
        self.to_na() == other.to_na()
    }
}

impl fmt::Debug for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.to_na();
        f.debug_struct("Vector3")
            .field("x", &v.x)
            .field("y", &v.y)
            .field("z", &v.z)
            .finish()
    }
}

impl From<na::Vector3<f32>> for Vector3 {
    fn from(v: na::Vector3<f32>) -> Self {
        Self::from_na(v)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::from_cartesian(x, y, z)
    }
}

impl Add for &Vector3 {
    type Output = Vector3;

    fn add(self, rhs: &Vector3) -> Vector3 {
        Vector3::from_na(self.to_na() + rhs.to_na())
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        &self + &rhs
    }
}

impl Sub for &Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: &Vector3) -> Vector3 {
        Vector3::from_na(self.to_na() - rhs.to_na())
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        &self - &rhs
    }
}

impl Mul<f32> for &Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f32) -> Vector3 {
        self.scale(rhs)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f32) -> Vector3 {
        self.scale(rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        self.scale(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn samples() -> Vec<Vector3> {
        vec![
            Vector3::from_cartesian(1.0, 2.0, 3.0),
            Vector3::from_cartesian(-4.5, 0.25, 1.0),
            Vector3::from_cartesian(0.001, -0.002, 0.003),
            Vector3::from_cartesian(-7.0, -7.0, -0.5),
            Vector3::from_cartesian(100.0, -3.0, 42.0),
        ]
    }

    #[test]
    fn test_normalize_unit_length() {
        for v in samples() {
            for mode in [Normalization::Exact, Normalization::Fast] {
                let n = v.normalize_with(mode);
                assert!((n.length() - 1.0).abs() < 1e-4, "{:?} with {:?}", v, mode);
            }
        }
    }

    #[test]
    fn test_normalize_zero_vector() {
        let zero = Vector3::zero();
        assert_eq!(zero.normalize(), zero);
        assert_eq!(zero.normalize_with(Normalization::Fast), zero);
        assert_eq!(Vector3::from_cartesian(1e-8, 0.0, 0.0).normalize(), zero);
    }

    #[test]
    fn test_fast_inv_sqrt_close_to_exact() {
        for value in [0.01_f32, 0.5, 1.0, 2.0, 10.0, 12345.0] {
            let exact = 1.0 / value.sqrt();
            let fast = Normalization::Fast.inv_sqrt(value);
            assert!(((fast - exact) / exact).abs() < 1e-5);
        }
    }

    #[test]
    fn test_spherical_round_trip() {
        for v in samples() {
            let s = v.spherical();
            let back = Vector3::from_spherical(s.r, s.theta, s.phi);
            let tolerance = 1e-4 * v.length().max(1.0);
            assert!(back.approx_eq(&v, tolerance), "{:?} -> {:?}", v, back);
        }
    }

    #[test]
    fn test_spherical_angle_ranges() {
        let v = Vector3::from_cartesian(1.0, -1.0, 0.0);
        let s = v.spherical();
        assert!((s.theta - FRAC_PI_2).abs() < 1e-6);
        assert!((s.phi - 7.0 * PI / 4.0).abs() < 1e-5);

        let up = Vector3::from_cartesian(0.0, 0.0, 2.0);
        assert!(up.theta().abs() < 1e-6);
        assert!((up.r() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_lazy_conversion_is_memoized() {
        let mut v = Vector3::from_cartesian(0.0, 3.0, 4.0);
        assert!(v.is_cartesian_valid());
        assert!(!v.is_spherical_valid());

        assert!((v.r() - 5.0).abs() < 1e-6);
        assert!(v.is_spherical_valid());
        assert!(v.is_cartesian_valid());

        v.set_spherical(1.0, FRAC_PI_2, 0.0);
        assert!(!v.is_cartesian_valid());
        assert!((v.x() - 1.0).abs() < 1e-6);
        assert!(v.is_cartesian_valid());

        v.set_cartesian(2.0, 0.0, 0.0);
        assert!(!v.is_spherical_valid());
        assert!((v.r() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_arithmetic_from_spherical_form() {
        let a = Vector3::from_spherical(1.0, FRAC_PI_2, 0.0);
        let b = Vector3::from_spherical(1.0, FRAC_PI_2, FRAC_PI_2);

        let sum = &a + &b;
        assert!(sum.is_cartesian_valid());
        assert!((a.clone() + b.clone()).approx_eq(&sum, 0.0));
        assert!((&sum - &b).approx_eq(&a, 1e-6));
        assert!(sum.approx_eq(&Vector3::from_cartesian(1.0, 1.0, 0.0), 1e-6));

        let cross = a.cross(&b);
        assert!(cross.approx_eq(&Vector3::from_cartesian(0.0, 0.0, 1.0), 1e-6));
        assert!(a.dot(&b).abs() < 1e-6);
        assert!((&sum - &b).approx_eq(&a, 1e-6));
    }

    #[test]
    fn test_slerp_same_vector() {
        let a = Vector3::from_cartesian(0.3, -1.2, 2.0);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!(a.slerp(&a, t).approx_eq(&a, 1e-5));
        }
    }

    #[test]
    fn test_slerp_quarter_turn() {
        let a = Vector3::from_cartesian(1.0, 0.0, 0.0);
        let b = Vector3::from_cartesian(0.0, 1.0, 0.0);
        let mid = a.slerp(&b, 0.5);
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!(mid.approx_eq(&Vector3::from_cartesian(h, h, 0.0), 1e-5));
        assert!(a.slerp(&b, 2.0).approx_eq(&b, 1e-5));
        assert!(a.slerp(&b, -1.0).approx_eq(&a, 1e-5));
    }

    #[test]
    fn test_slerp_opposite_and_zero() {
        let a = Vector3::from_cartesian(0.0, 0.0, 1.0);
        let b = Vector3::from_cartesian(0.0, 0.0, -1.0);
        let mid = a.slerp(&b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!(mid.z().abs() < 1e-5);

        let zero = Vector3::zero();
        let blended = zero.slerp(&a, 0.5);
        assert!(blended.approx_eq(&Vector3::from_cartesian(0.0, 0.0, 0.5), 1e-6));
    }

    #[test]
    fn test_bezier_endpoints() {
        let p0 = Vector3::from_cartesian(0.0, 0.0, 0.0);
        let p1 = Vector3::from_cartesian(1.0, 2.0, 0.0);
        let p2 = Vector3::from_cartesian(3.0, 2.0, 0.0);
        let p3 = Vector3::from_cartesian(4.0, 0.0, 0.0);

        assert!(bezier_cubic(&p0, &p1, &p2, &p3, 0.0).approx_eq(&p0, 1e-6));
        assert!(bezier_cubic(&p0, &p1, &p2, &p3, 1.0).approx_eq(&p3, 1e-6));
        assert!(bezier_cubic(&p0, &p1, &p2, &p3, 7.0).approx_eq(&p3, 1e-6));

        let mid = bezier_cubic(&p0, &p1, &p2, &p3, 0.5);
        assert!(mid.approx_eq(&Vector3::from_cartesian(2.0, 1.5, 0.0), 1e-6));
    }
}
