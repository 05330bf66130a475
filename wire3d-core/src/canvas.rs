/// Software canvas with bilinear splatting and antialiased thick lines
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::CanvasError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Mean channel value mapped to [0, 1].
    pub fn intensity(&self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / (3.0 * 255.0)
    }
}

/// A pixel that can absorb weighted color contributions.
///
/// Each contribution is added and then clamped to the pixel's valid range,
/// which avoids wraparound but is not alpha blending.
pub trait Pixel: Copy + Default {
    fn accumulate(&mut self, color: Rgb, weight: f32);

    /// Brightness in [0, 1].
    fn luminance(&self) -> f32;
}

/// Each contribution is rounded to a whole 8-bit level on its own, so a
/// splat whose per-corner share is below half a level leaves no trace.
/// Use an intensity canvas when faint fringes must be conserved.
impl Pixel for Rgb {
    fn accumulate(&mut self, color: Rgb, weight: f32) {
        let add = |dst: u8, src: u8| (dst as f32 + src as f32 * weight).round().clamp(0.0, 255.0) as u8;
        self.r = add(self.r, color.r);
        self.g = add(self.g, color.g);
        self.b = add(self.b, color.b);
    }

    fn luminance(&self) -> f32 {
        self.intensity()
    }
}

/// Single-channel intensity in [0, 1].
impl Pixel for f32 {
    fn accumulate(&mut self, color: Rgb, weight: f32) {
        *self = (*self + color.intensity() * weight).clamp(0.0, 1.0);
    }

    fn luminance(&self) -> f32 {
        *self
    }
}

/// A width x height pixel grid, stored row-major.
#[derive(Debug, Clone)]
pub struct Canvas<P: Pixel = Rgb> {
    width: usize,
    height: usize,
    pixels: Vec<P>,
}

pub type RgbCanvas = Canvas<Rgb>;
pub type IntensityCanvas = Canvas<f32>;

impl<P: Pixel> Canvas<P> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![P::default(); width * height],
        }
    }

    /// Like `new`, but reports a failed allocation instead of aborting.
    pub fn try_new(width: usize, height: usize) -> Result<Self, CanvasError> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::TooLarge { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|source| CanvasError::Allocation {
                width,
                height,
                source,
            })?;
        pixels.resize(len, P::default());
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset every pixel to zero in place.
    pub fn clear(&mut self) {
        self.pixels.fill(P::default());
    }

    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<P> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    fn splat(&mut self, x: i64, y: i64, color: Rgb, weight: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx].accumulate(color, weight);
    }

    /// Spread `weight` of `color` over the four pixels around a fractional
    /// position using bilinear weights. Corners outside the canvas are dropped.
    pub fn set_pixel(&mut self, x: f32, y: f32, color: Rgb, weight: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let fx = x.floor();
        let fy = y.floor();
        let dx = x - fx;
        let dy = y - fy;
        let (x0, y0) = (fx as i64, fy as i64);

        self.splat(x0, y0, color, weight * (1.0 - dx) * (1.0 - dy));
        self.splat(x0 + 1, y0, color, weight * dx * (1.0 - dy));
        self.splat(x0, y0 + 1, color, weight * (1.0 - dx) * dy);
        self.splat(x0 + 1, y0 + 1, color, weight * dx * dy);
    }

    /// Stamp a filled disc of the given diameter, one splat per integer offset.
    pub fn draw_disc(&mut self, x: f32, y: f32, diameter: f32, color: Rgb) {
        let radius = diameter / 2.0;
        let reach = radius.ceil() as i32;
        for oy in -reach..=reach {
            for ox in -reach..=reach {
                let dist = ((ox * ox + oy * oy) as f32).sqrt();
                if dist <= radius {
                    self.set_pixel(x + ox as f32, y + oy as f32, color, 1.0);
                }
            }
        }
    }

    /// Thick antialiased line: a DDA walk stamping a disc at every step.
    ///
    /// The walk takes `max(|dx|, |dy|)` steps (at least one). A zero-length
    /// segment draws nothing. The segment is first clipped to the canvas
    /// grown by the disc radius, so off-screen stretches cost no steps.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32, color: Rgb) {
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if length == 0.0 || !length.is_finite() {
            return;
        }

        let margin = (thickness / 2.0).max(0.0).ceil() + 1.0;
        let Some((x0, y0, x1, y1)) = clip_segment(
            (x0, y0),
            (x1, y1),
            (-margin, -margin),
            (self.width as f32 + margin, self.height as f32 + margin),
        ) else {
            trace!(x0, y0, x1, y1, "line entirely off canvas");
            return;
        };

        let dx = x1 - x0;
        let dy = y1 - y0;

        let steps = (dx.abs().max(dy.abs()) as u32).max(1);
        let x_inc = dx / steps as f32;
        let y_inc = dy / steps as f32;

        for i in 0..=steps {
            let x = x0 + i as f32 * x_inc;
            let y = y0 + i as f32 * y_inc;
            self.draw_disc(x, y, thickness, color);
        }
    }

    /// Whether a point lies in the circle inscribed in the canvas.
    pub fn in_circular_viewport(&self, x: f32, y: f32) -> bool {
        in_inscribed_circle(self.width, self.height, x, y)
    }
}

/// Whether `(x, y)` lies in the circle inscribed in a `width x height` area.
pub(crate) fn in_inscribed_circle(width: usize, height: usize, x: f32, y: f32) -> bool {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = cx.min(cy);
    let (ox, oy) = (x - cx, y - cy);
    ox * ox + oy * oy <= radius * radius
}

/// Liang-Barsky clip of a segment against an axis-aligned box.
///
/// Runs in f64 so endpoints far off screen still clip to the right place.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<(f32, f32, f32, f32)> {
    let (x0, y0) = (f64::from(from.0), f64::from(from.1));
    let dx = f64::from(to.0) - x0;
    let dy = f64::from(to.1) - y0;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, x0 - f64::from(min.0)),
        (dx, f64::from(max.0) - x0),
        (-dy, y0 - f64::from(min.1)),
        (dy, f64::from(max.1) - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (x0 + t0 * dx) as f32,
        (y0 + t0 * dy) as f32,
        (x0 + t1 * dx) as f32,
        (y0 + t1 * dy) as f32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(canvas: &IntensityCanvas) -> f32 {
        canvas.pixels().iter().sum()
    }

    #[test]
    fn test_new_canvas_is_black() {
        let canvas = RgbCanvas::new(4, 3);
        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|p| *p == Rgb::BLACK));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_try_new_rejects_overflow() {
        assert!(matches!(
            IntensityCanvas::try_new(usize::MAX, 2),
            Err(CanvasError::TooLarge { .. })
        ));
        assert_eq!(IntensityCanvas::try_new(3, 3).unwrap().pixels().len(), 9);
    }

    #[test]
    fn test_bilinear_weights() {
        let mut canvas = IntensityCanvas::new(4, 4);
        canvas.set_pixel(1.25, 2.5, Rgb::WHITE, 0.8);

        assert!((canvas.pixel(1, 2).unwrap() - 0.8 * 0.75 * 0.5).abs() < 1e-6);
        assert!((canvas.pixel(2, 2).unwrap() - 0.8 * 0.25 * 0.5).abs() < 1e-6);
        assert!((canvas.pixel(1, 3).unwrap() - 0.8 * 0.75 * 0.5).abs() < 1e-6);
        assert!((canvas.pixel(2, 3).unwrap() - 0.8 * 0.25 * 0.5).abs() < 1e-6);
        assert!((total(&canvas) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_splat_conservation_at_border() {
        let mut canvas = IntensityCanvas::new(4, 4);
        // Only the (3, 3) corner is inside; it receives (1 - 0.4) * (1 - 0.7).
        canvas.set_pixel(3.4, 3.7, Rgb::WHITE, 1.0);
        assert!((total(&canvas) - 0.6 * 0.3).abs() < 1e-6);

        canvas.clear();
        canvas.set_pixel(-0.5, 1.0, Rgb::WHITE, 1.0);
        assert!((total(&canvas) - 0.5).abs() < 1e-6);

        canvas.clear();
        canvas.set_pixel(-5.0, -5.0, Rgb::WHITE, 1.0);
        assert_eq!(total(&canvas), 0.0);
    }

    #[test]
    fn test_accumulation_clamps() {
        let mut canvas = RgbCanvas::new(2, 2);
        for _ in 0..4 {
            canvas.set_pixel(0.0, 0.0, Rgb::new(200, 100, 0), 1.0);
        }
        assert_eq!(canvas.pixel(0, 0), Some(Rgb::new(255, 255, 0)));
        assert_eq!(canvas.pixel(1, 1), Some(Rgb::BLACK));

        let mut gray = IntensityCanvas::new(1, 1);
        gray.set_pixel(0.0, 0.0, Rgb::WHITE, 3.0);
        assert_eq!(gray.pixel(0, 0), Some(1.0));
    }

    #[test]
    fn test_clear_keeps_size() {
        let mut canvas = RgbCanvas::new(8, 8);
        canvas.draw_line(0.0, 0.0, 7.0, 7.0, 1.0, Rgb::WHITE);
        assert!(canvas.pixels().iter().any(|p| *p != Rgb::BLACK));
        canvas.clear();
        assert_eq!(canvas.width(), 8);
        assert_eq!(canvas.height(), 8);
        assert!(canvas.pixels().iter().all(|p| *p == Rgb::BLACK));
    }

    #[test]
    fn test_zero_length_line_is_noop() {
        let mut canvas = IntensityCanvas::new(20, 20);
        canvas.draw_line(10.0, 10.0, 10.0, 10.0, 4.0, Rgb::WHITE);
        assert_eq!(total(&canvas), 0.0);
    }

    #[test]
    fn test_disc_radius_two() {
        let mut canvas = IntensityCanvas::new(20, 20);
        canvas.draw_disc(10.0, 10.0, 4.0, Rgb::WHITE);

        for y in 0..20_i32 {
            for x in 0..20_i32 {
                let d2 = (x - 10).pow(2) + (y - 10).pow(2);
                let lit = canvas.pixel(x as usize, y as usize).unwrap() > 0.0;
                assert_eq!(lit, d2 <= 4, "pixel ({}, {})", x, y);
            }
        }
        // 13 integer offsets lie within radius 2.
        assert!((total(&canvas) - 13.0).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_line_coverage() {
        let mut canvas = IntensityCanvas::new(16, 8);
        canvas.draw_line(2.0, 4.0, 12.0, 4.0, 1.0, Rgb::WHITE);
        for x in 2..=12 {
            assert_eq!(canvas.pixel(x, 4), Some(1.0));
        }
        assert_eq!(canvas.pixel(1, 4), Some(0.0));
        assert_eq!(canvas.pixel(13, 4), Some(0.0));
        assert_eq!(canvas.pixel(5, 3), Some(0.0));
    }

    #[test]
    fn test_steep_negative_line() {
        let mut canvas = IntensityCanvas::new(8, 16);
        canvas.draw_line(4.0, 14.0, 4.0, 1.0, 1.0, Rgb::WHITE);
        for y in 1..=14 {
            assert_eq!(canvas.pixel(4, y), Some(1.0));
        }
    }

    #[test]
    fn test_rgb_splat_quantizes_each_corner() {
        let mut canvas = RgbCanvas::new(4, 4);
        // A quarter of one level per corner rounds away.
        canvas.set_pixel(1.5, 1.5, Rgb::new(1, 1, 1), 1.0);
        assert!(canvas.pixels().iter().all(|p| *p == Rgb::BLACK));

        // Shares that are whole levels are kept exactly.
        canvas.set_pixel(1.5, 1.5, Rgb::new(200, 100, 40), 1.0);
        let red: u32 = canvas.pixels().iter().map(|p| u32::from(p.r)).sum();
        assert_eq!(red, 200);
        assert_eq!(canvas.pixel(2, 2), Some(Rgb::new(50, 25, 10)));
    }

    #[test]
    fn test_far_off_screen_line_is_clipped() {
        let mut canvas = IntensityCanvas::new(16, 8);
        canvas.draw_line(-1.0e9, 5.0, 1.0e9, 5.0, 1.0, Rgb::WHITE);
        for x in 0..16 {
            assert!(canvas.pixel(x, 5).unwrap() > 0.99, "pixel ({}, 5)", x);
        }
        assert_eq!(canvas.pixel(3, 2), Some(0.0));

        canvas.clear();
        canvas.draw_line(-1.0e9, -50.0, 1.0e9, -40.0, 2.0, Rgb::WHITE);
        assert_eq!(total(&canvas), 0.0);
    }

    #[test]
    fn test_clip_segment() {
        assert_eq!(
            clip_segment((-10.0, 2.0), (10.0, 2.0), (0.0, 0.0), (4.0, 4.0)),
            Some((0.0, 2.0, 4.0, 2.0))
        );
        assert_eq!(
            clip_segment((1.0, 1.0), (3.0, 3.0), (0.0, 0.0), (4.0, 4.0)),
            Some((1.0, 1.0, 3.0, 3.0))
        );
        assert_eq!(clip_segment((5.0, 0.0), (5.0, 4.0), (0.0, 0.0), (4.0, 4.0)), None);
    }

    #[test]
    fn test_circular_viewport() {
        let canvas = RgbCanvas::new(100, 50);
        assert!(canvas.in_circular_viewport(50.0, 25.0));
        assert!(canvas.in_circular_viewport(70.0, 25.0));
        assert!(!canvas.in_circular_viewport(80.0, 25.0));
        assert!(!canvas.in_circular_viewport(0.0, 0.0));
    }
}
