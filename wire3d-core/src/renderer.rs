/// Wireframe and point-cloud rendering
///
/// A render call is a pure function of its inputs apart from the surface it
/// draws on. Edges are projected, culled against the near plane, lit in
/// world space, sorted by ascending average depth and rasterized in that order.
use tracing::{debug, trace, warn};

use crate::canvas::{in_inscribed_circle, Canvas, Pixel, Rgb};
use crate::error::RenderError;
use crate::geometry::Geometry;
use crate::lighting::edge_intensity_with;
use crate::projection::{ndc_to_screen, ScreenPoint, Transforms};
use crate::settings::RenderSettings;
use crate::vector::Vector3;

/// Anything the renderer can rasterize onto.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb);
    fn draw_point(&mut self, at: (f32, f32), size: f32, color: Rgb);

    fn in_circular_viewport(&self, x: f32, y: f32) -> bool {
        in_inscribed_circle(self.width(), self.height(), x, y)
    }
}

impl<P: Pixel> Surface for Canvas<P> {
    fn width(&self) -> usize {
        Canvas::width(self)
    }

    fn height(&self) -> usize {
        Canvas::height(self)
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        Canvas::draw_line(self, from.0, from.1, to.0, to.1, thickness, color);
    }

    fn draw_point(&mut self, at: (f32, f32), size: f32, color: Rgb) {
        self.draw_disc(at.0, at.1, size, color);
    }
}

/// A projected, lit edge waiting to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLine {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
    pub average_depth: f32,
    pub color: Rgb,
}

/// What happened to the primitives of one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    /// Rejected by the near plane or the circular viewport.
    pub culled: usize,
    /// Edges referencing a missing vertex.
    pub skipped: usize,
}

/// Stateless wireframe renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render `geometry` as lit, depth-sorted lines.
    ///
    /// On allocation failure nothing is drawn.
    pub fn render_wireframe<S: Surface>(
        &self,
        surface: &mut S,
        geometry: &Geometry,
        transforms: &Transforms,
        lights: &[Vector3],
        thickness: f32,
    ) -> Result<RenderStats, RenderError> {
        let (lines, mut stats) = self.prepare_lines(surface, geometry, transforms, lights)?;

        for line in &lines {
            surface.draw_line(
                (line.start.x, line.start.y),
                (line.end.x, line.end.y),
                thickness,
                line.color,
            );
        }
        stats.drawn = lines.len();

        debug!(
            drawn = stats.drawn,
            culled = stats.culled,
            skipped = stats.skipped,
            "wireframe rendered"
        );
        Ok(stats)
    }

    /// Project, cull, light and sort the edges without drawing them.
    pub fn prepare_lines<S: Surface>(
        &self,
        surface: &S,
        geometry: &Geometry,
        transforms: &Transforms,
        lights: &[Vector3],
    ) -> Result<(Vec<RenderLine>, RenderStats), RenderError> {
        let mut lines: Vec<RenderLine> = Vec::new();
        lines
            .try_reserve_exact(geometry.edge_count())
            .map_err(|source| RenderError::Allocation {
                lines: geometry.edge_count(),
                source,
            })?;

        let mut stats = RenderStats::default();
        let (width, height) = (surface.width(), surface.height());
        let boost = self.settings.boost();

        for (i, &edge) in geometry.edges.iter().enumerate() {
            let Some((v0, v1)) = geometry.edge_vertices(edge) else {
                warn!(
                    edge = i,
                    indices = ?edge,
                    vertices = geometry.vertex_count(),
                    "skipping edge with invalid vertex index"
                );
                stats.skipped += 1;
                continue;
            };

            let p0 = transforms.project(v0);
            let p1 = transforms.project(v1);
            if p0.w <= self.settings.near_epsilon || p1.w <= self.settings.near_epsilon {
                trace!(edge = i, w0 = p0.w, w1 = p1.w, "edge culled at near plane");
                stats.culled += 1;
                continue;
            }

            let start = ndc_to_screen(&p0, width, height);
            let end = ndc_to_screen(&p1, width, height);
            if self.settings.circular_viewport
                && !(surface.in_circular_viewport(start.x, start.y)
                    && surface.in_circular_viewport(end.x, end.y))
            {
                stats.culled += 1;
                continue;
            }

            let intensity = edge_intensity_with(
                &transforms.to_world(v0),
                &transforms.to_world(v1),
                lights,
                self.settings.normalization,
            );

            lines.push(RenderLine {
                start,
                end,
                average_depth: (start.depth + end.depth) / 2.0,
                color: boost.grayscale(intensity),
            });
        }

        // Ascending average depth; ties keep edge order.
        lines.sort_by(|a, b| a.average_depth.total_cmp(&b.average_depth));

        Ok((lines, stats))
    }

    /// Render every vertex as a dot of `point_size` pixels. No lighting, no sorting.
    pub fn render_points<S: Surface>(
        &self,
        surface: &mut S,
        geometry: &Geometry,
        transforms: &Transforms,
        point_size: f32,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let (width, height) = (surface.width(), surface.height());

        for vertex in &geometry.vertices {
            let clip = transforms.project(vertex);
            if clip.w <= self.settings.near_epsilon {
                stats.culled += 1;
                continue;
            }

            let p = ndc_to_screen(&clip, width, height);
            if self.settings.circular_viewport && !surface.in_circular_viewport(p.x, p.y) {
                stats.culled += 1;
                continue;
            }

            surface.draw_point((p.x, p.y), point_size, self.settings.point_color);
            stats.drawn += 1;
        }

        debug!(drawn = stats.drawn, culled = stats.culled, "points rendered");
        stats
    }
}
