//! Sweep plots
//!
//! Renders a persisted benchmark result as a line plot (x = parameter,
//! y = mean) next to the JSON file, and opens it in the platform viewer.

use plotters::prelude::*;
use result_format::{BenchmarkResult, FormatError};
use std::fmt::Display;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: Display>(e: E) -> PlotError {
    PlotError::Draw(e.to_string())
}

/// Title and axis descriptions for a result file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotLabels {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

impl PlotLabels {
    fn new(title: &str, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
        }
    }

    /// Labels keyed on the file stem; empty for unknown files
    pub fn for_file(path: &Path) -> Self {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        match stem {
            "time-benchmark" => Self::new(
                "Packet delivery time by node count",
                "Number of nodes",
                "Elapsed time (s)",
            ),
            "speed-benchmark" => Self::new(
                "Failed deliveries by node speed",
                "Node speed (m/s)",
                "Failed deliveries",
            ),
            "nodes-benchmark" => Self::new(
                "Failed deliveries by node count",
                "Number of nodes",
                "Failed deliveries",
            ),
            _ => Self::default(),
        }
    }
}

/// Turns a persisted result file into an image; returns the image path
pub trait Renderer {
    fn render(&self, result_file: &Path) -> Result<PathBuf, PlotError>;
}

/// SVG line plot written beside the JSON file
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub size: (u32, u32),
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self { size: (1200, 700) }
    }
}

impl SvgRenderer {
    pub fn image_path(result_file: &Path) -> PathBuf {
        result_file.with_extension("svg")
    }

    fn draw(
        &self,
        out_path: &Path,
        labels: &PlotLabels,
        result: &BenchmarkResult,
    ) -> Result<(), PlotError> {
        let points: Vec<(f64, f64)> = result
            .entries()
            .iter()
            .map(|&(p, mean)| (p as f64, mean))
            .collect();
        let (x_range, y_range) = axis_ranges(&points);

        let root = SVGBackend::new(out_path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(labels.x_desc.as_str())
            .y_desc(labels.y_desc.as_str())
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(draw_err)?;
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, result_file: &Path) -> Result<PathBuf, PlotError> {
        let result = BenchmarkResult::load(result_file)?;
        let labels = PlotLabels::for_file(result_file);
        let out_path = Self::image_path(result_file);

        self.draw(&out_path, &labels, &result)?;
        info!(path = %out_path.display(), points = result.len(), "plot written");
        Ok(out_path)
    }
}

/// Axis ranges covering all points, padded so flat series stay visible
fn axis_ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    if points.is_empty() {
        return (0.0..1.0, 0.0..1.0);
    }

    let (mut x_min, mut x_max) = (f64::MAX, f64::MIN);
    let (mut y_min, mut y_max) = (f64::MAX, f64::MIN);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let y_min = y_min.min(0.0);
    let y_pad = ((y_max - y_min) * 0.05).max(1e-9);
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    (x_min..x_max, y_min..y_max + y_pad)
}

/// Open an image in the desktop viewer without waiting for it
pub fn open_in_viewer(path: &Path) -> io::Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    cmd.arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
