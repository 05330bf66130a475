/// Terminal preview for wire3d wireframes
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wire3d_core::{
    bezier_cubic, Frustum, Geometry, IntensityCanvas, RenderSettings, RenderStats, Renderer,
    RotationState, Transform, Transforms, Vector3,
};

pub mod renderer;

pub use renderer::AsciiPresenter;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_WIDTH: usize = 2;
const CELL_HEIGHT: usize = 4;

/// How the preview draws and animates
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub frames: u32,
    pub fps: u32,
    pub thickness: f32,
    /// Camera distance at the start and end of the run.
    pub distance: (f32, f32),
    pub points: bool,
    pub lights: Vec<Vector3>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            frames: 120,
            fps: 30,
            thickness: 1.0,
            distance: (5.0, 5.0),
            points: false,
            lights: vec![Vector3::from_cartesian(0.0, 0.0, -1.0)],
        }
    }
}

/// Renders a spinning geometry into the terminal for a fixed number of frames.
pub struct Preview {
    geometry: Geometry,
    rotation: RotationState,
    options: PreviewOptions,
    renderer: Renderer,
    canvas: IntensityCanvas,
    presenter: AsciiPresenter,
}

impl Preview {
    pub fn new(
        geometry: Geometry,
        settings: RenderSettings,
        options: PreviewOptions,
        columns: usize,
        rows: usize,
    ) -> Self {
        // Keep the last row for the status line.
        let presenter = AsciiPresenter::new(columns, rows.saturating_sub(1), CELL_WIDTH, CELL_HEIGHT);
        let (width, height) = presenter.canvas_size();

        Self {
            geometry,
            rotation: RotationState::new(0.3, 0.3, 0.0),
            options,
            renderer: Renderer::new(settings),
            canvas: IntensityCanvas::new(width, height),
            presenter,
        }
    }

    /// Camera distance for a frame, eased along a cubic curve.
    fn camera_distance(&self, frame: u32) -> f32 {
        let (start, end) = self.options.distance;
        let t = if self.options.frames > 1 {
            frame as f32 / (self.options.frames - 1) as f32
        } else {
            0.0
        };
        let p0 = Vector3::from_cartesian(0.0, 0.0, start);
        let p3 = Vector3::from_cartesian(0.0, 0.0, end);
        bezier_cubic(&p0, &p0, &p3, &p3, t).z()
    }

    fn transforms(&self, frame: u32) -> Transforms {
        let aspect = self.canvas.width() as f32 / self.canvas.height().max(1) as f32;
        Transforms::new(
            self.rotation.matrix(),
            Transform::translation(0.0, 0.0, -self.camera_distance(frame)),
            Frustum::symmetric(1.0, aspect, 1.0, 100.0).projection_matrix(),
        )
    }

    /// Render one frame into the canvas and the character buffer.
    pub fn render_frame(&mut self, frame: u32) -> anyhow::Result<RenderStats> {
        let transforms = self.transforms(frame);
        self.canvas.clear();

        let stats = if self.options.points {
            self.renderer.render_points(
                &mut self.canvas,
                &self.geometry,
                &transforms,
                self.options.thickness.max(1.0) * 2.0,
            )
        } else {
            self.renderer.render_wireframe(
                &mut self.canvas,
                &self.geometry,
                &transforms,
                &self.options.lights,
                self.options.thickness,
            )?
        };

        self.presenter.capture(&self.canvas);
        Ok(stats)
    }

    pub fn presenter(&self) -> &AsciiPresenter {
        &self.presenter
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.options.fps.max(1)));
        let started = Instant::now();

        for frame in 0..self.options.frames {
            let frame_start = Instant::now();

            self.rotation.rotate(0.01, 0.015, 0.0);
            let stats = self.render_frame(frame)?;
            debug!(frame, drawn = stats.drawn, culled = stats.culled, "frame rendered");
            self.draw(frame, &stats)?;

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        let seconds = started.elapsed().as_secs_f32();
        info!(
            frames = self.options.frames,
            fps = self.options.frames as f32 / seconds.max(f32::EPSILON),
            "preview finished"
        );
        Ok(())
    }

    fn draw(&self, frame: u32, stats: &RenderStats) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.presenter.draw(&mut stdout)?;

        // Status line below the picture
        queue!(
            stdout,
            cursor::MoveTo(0, self.presenter.rows() as u16),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "wire3d | frame {}/{} | {} drawn, {} culled, {} skipped",
                frame + 1,
                self.options.frames,
                stats.drawn,
                stats.culled,
                stats.skipped
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}
