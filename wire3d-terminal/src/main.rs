/// wire3d terminal preview
///
/// Renders a wireframe (a unit cube, or an STL file) spinning in the
/// terminal for a fixed number of frames.
use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wire3d_core::{stl, Geometry, RenderSettings, Vector3};
use wire3d_terminal::{Preview, PreviewOptions};

#[derive(Parser)]
#[command(name = "wire3d-terminal", about = "Preview a wireframe in the terminal")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// STL file to render instead of the built-in cube
    #[arg(long)]
    stl: Option<PathBuf>,

    /// JSON file with render settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to render
    #[arg(short, long, default_value = "120")]
    frames: u32,

    /// Target frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Line thickness in canvas pixels
    #[arg(short, long, default_value = "1.0")]
    thickness: f32,

    /// Camera distance at the first frame
    #[arg(short, long, default_value = "5.0")]
    distance: f32,

    /// Camera distance at the last frame (defaults to --distance)
    #[arg(long)]
    end_distance: Option<f32>,

    /// Draw vertices as points instead of edges
    #[arg(long)]
    points: bool,
}

fn unit_cube() -> Geometry {
    let vertices = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ]
    .map(Vector3::from)
    .to_vec();
    let edges = vec![
        [0, 1], [1, 2], [2, 3], [3, 0],
        [4, 5], [5, 6], [6, 7], [7, 4],
        [0, 4], [1, 5], [2, 6], [3, 7],
    ];
    Geometry::new(vertices, edges)
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<RenderSettings> {
    let Some(path) = path else {
        return Ok(RenderSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_geometry(path: Option<&PathBuf>) -> anyhow::Result<Geometry> {
    let Some(path) = path else {
        return Ok(unit_cube());
    };
    let data = fs::read(path).with_context(|| format!("failed to read STL file {}", path.display()))?;
    let geometry = stl::parse_stl(&data).with_context(|| format!("failed to parse STL {}", path.display()))?;
    info!(
        vertices = geometry.vertex_count(),
        edges = geometry.edge_count(),
        "loaded {}",
        path.display()
    );
    Ok(geometry)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_ref())?;
    let geometry = load_geometry(cli.stl.as_ref())?;

    let options = PreviewOptions {
        frames: cli.frames,
        fps: cli.fps,
        thickness: cli.thickness,
        distance: (cli.distance, cli.end_distance.unwrap_or(cli.distance)),
        points: cli.points,
        ..PreviewOptions::default()
    };

    let (columns, rows) = crossterm::terminal::size().context("failed to query terminal size")?;
    let mut preview = Preview::new(geometry, settings, options, columns as usize, rows as usize);
    preview.run()
}
