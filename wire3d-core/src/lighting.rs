/// Lambertian edge lighting
use crate::canvas::Rgb;
use crate::vector::{Normalization, Vector3};

/// Average of `max(0, edge · light)` over all lights, in [0, 1].
///
/// Both the edge direction (v1 to v2) and the light directions are
/// normalized first. With no lights, or a degenerate edge, the result is 0.
pub fn edge_intensity(v1: &Vector3, v2: &Vector3, lights: &[Vector3]) -> f32 {
    edge_intensity_with(v1, v2, lights, Normalization::Exact)
}

pub fn edge_intensity_with(
    v1: &Vector3,
    v2: &Vector3,
    lights: &[Vector3],
    mode: Normalization,
) -> f32 {
    if lights.is_empty() {
        return 0.0;
    }

    let edge_dir = (v2 - v1).normalize_with(mode);
    let sum: f32 = lights
        .iter()
        .map(|light| edge_dir.dot(&light.normalize_with(mode)).max(0.0))
        .sum();

    (sum / lights.len() as f32).clamp(0.0, 1.0)
}

/// Power curve applied to intensities before they become colors.
///
/// Exponents below 1 lift dim edges; 1 leaves intensities unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightBoost {
    pub exponent: f32,
}

impl LightBoost {
    pub fn new(exponent: f32) -> Self {
        Self { exponent }
    }

    pub fn apply(&self, intensity: f32) -> f32 {
        intensity.clamp(0.0, 1.0).powf(self.exponent)
    }

    pub fn grayscale(&self, intensity: f32) -> Rgb {
        Rgb::gray((self.apply(intensity) * 255.0).round() as u8)
    }
}

impl Default for LightBoost {
    fn default() -> Self {
        Self::new(0.5)
    }
}
