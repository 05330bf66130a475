/// wire3d core library - software wireframe rendering
///
/// Vector and matrix math, a splatting canvas, clip-space projection, edge
/// lighting and a painter's-algorithm wireframe renderer. Everything runs on
/// the calling thread; the only state that outlives a render call is the
/// canvas the caller owns.

pub mod canvas;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod projection;
pub mod renderer;
pub mod settings;
pub mod stl;
pub mod transform;
pub mod vector;

// Re-export commonly used types
pub use canvas::{Canvas, IntensityCanvas, Pixel, Rgb, RgbCanvas};
pub use error::{CanvasError, GeometryError, RenderError, StlError};
pub use geometry::{Geometry, GeometryBuilder};
pub use lighting::{edge_intensity, LightBoost};
pub use projection::{ndc_to_screen, project_vertex, Frustum, ScreenPoint, Transforms};
pub use renderer::{RenderLine, RenderStats, Renderer, Surface};
pub use settings::RenderSettings;
pub use transform::{Mat4, RotationState, Transform, Vec4};
pub use vector::{bezier_cubic, Normalization, Spherical, Vector3};
