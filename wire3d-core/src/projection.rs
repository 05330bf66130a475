/// Clip-space projection and screen mapping
use crate::transform::{Mat4, Transform, Vec4};
use crate::vector::Vector3;

/// Model, view and projection matrices for one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }

    pub fn mvp(&self) -> Mat4 {
        Transform::mvp_matrix(&self.model, &self.view, &self.projection)
    }

    /// Object space to world space (model only).
    pub fn to_world(&self, vertex: &Vector3) -> Vector3 {
        Transform::transform_point(&self.model, vertex)
    }

    pub fn project(&self, vertex: &Vector3) -> Vec4 {
        project_vertex(vertex, &self.model, &self.view, &self.projection)
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new(Mat4::identity(), Mat4::identity(), Mat4::identity())
    }
}

/// Asymmetric viewing frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Symmetric frustum whose near plane spans `[-half_width, half_width]` horizontally.
    pub fn symmetric(half_width: f32, aspect: f32, near: f32, far: f32) -> Self {
        let half_height = half_width / aspect;
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Transform::perspective(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::symmetric(1.0, 1.0, 1.0, 100.0)
    }
}

/// A projected point in pixel coordinates with its NDC depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// NDC z, used only for ordering.
    pub depth: f32,
}

/// Object space to clip space: model, then view, then projection.
///
/// No perspective divide; the caller rejects `w` near zero first.
pub fn project_vertex(vertex: &Vector3, model: &Mat4, view: &Mat4, projection: &Mat4) -> Vec4 {
    let [x, y, z] = vertex.cartesian();
    let local = Vec4::new(x, y, z, 1.0);
    let world = Transform::multiply_vec4(model, &local);
    let camera = Transform::multiply_vec4(view, &world);
    Transform::multiply_vec4(projection, &camera)
}

/// Perspective divide and viewport mapping. Screen Y grows downwards.
pub fn ndc_to_screen(clip: &Vec4, width: usize, height: usize) -> ScreenPoint {
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;

    ScreenPoint {
        x: (ndc_x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc_y) * 0.5 * height as f32,
        depth: ndc_z,
    }
}
