/// Render configuration
use serde::{Deserialize, Serialize};

use crate::canvas::Rgb;
use crate::lighting::LightBoost;
use crate::vector::Normalization;

/// Default near-plane rejection threshold on clip `w`.
pub const DEFAULT_NEAR_EPSILON: f32 = f32::EPSILON * 100.0;

/// Tunables for a render call. Missing fields in a config file take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Edges and points with clip `w` at or below this are culled.
    pub near_epsilon: f32,
    /// Exponent of the brightness curve applied to edge intensities.
    pub light_boost: f32,
    pub normalization: Normalization,
    pub point_color: Rgb,
    /// Cull anything outside the circle inscribed in the canvas.
    pub circular_viewport: bool,
}

impl RenderSettings {
    pub fn boost(&self) -> LightBoost {
        LightBoost::new(self.light_boost)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            near_epsilon: DEFAULT_NEAR_EPSILON,
            light_boost: LightBoost::default().exponent,
            normalization: Normalization::Exact,
            point_color: Rgb::WHITE,
            circular_viewport: false,
        }
    }
}
