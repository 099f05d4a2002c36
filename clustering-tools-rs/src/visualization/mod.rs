//! Visualization of offset traversal order.
//!
//! Draws an offset sequence as a PNG: every sample is a point coloured by its
//! position in the sequence (blue first, red last) and consecutive samples are
//! joined by a faint line so the quadrant interleaving is visible.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::offsets::{GridSize, Offset};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Empty offset sequence")]
    EmptySequence,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Colour of the path joining consecutive samples.
const PATH_COLOR: RGBAColor = RGBAColor(120, 120, 120, 0.35);

/// Colour of the cell boundaries.
const GRID_COLOR: RGBAColor = RGBAColor(200, 200, 200, 1.0);

/// Colour for the sample at `index` in a sequence of `len` samples.
///
/// Interpolates linearly from blue (first) to red (last).
pub fn order_color(index: usize, len: usize) -> RGBColor {
    let t = if len > 1 {
        index.min(len - 1) as f64 / (len - 1) as f64
    } else {
        0.0
    };
    let r = (30.0 + t * (228.0 - 30.0)).round() as u8;
    let g = (90.0 * (1.0 - t) + 26.0 * t).round() as u8;
    let b = (220.0 * (1.0 - t) + 28.0 * t).round() as u8;
    RGBColor(r, g, b)
}

/// Plot an offset sequence on its `n×n` grid and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `offsets` - Sequence to draw, in traversal order
/// * `grid` - Grid the offsets live on
/// * `width` / `height` - Image size in pixels
pub fn plot_offsets(
    output_path: &Path,
    offsets: &[Offset],
    grid: GridSize,
    width: u32,
    height: u32,
) -> Result<()> {
    if offsets.is_empty() {
        return Err(VisualizationError::EmptySequence);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let n = grid.get() as f64;
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // No axis labels: the bitmap backend is built without a font renderer
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0.0..n, 0.0..n)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Cell boundaries
    for i in 0..=grid.get() {
        let v = i as f64;
        chart
            .draw_series(LineSeries::new(vec![(v, 0.0), (v, n)], GRID_COLOR))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        chart
            .draw_series(LineSeries::new(vec![(0.0, v), (n, v)], GRID_COLOR))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    // Samples sit at cell centres
    let centers: Vec<(f64, f64)> = offsets
        .iter()
        .map(|o| (o.x as f64 + 0.5, o.y as f64 + 0.5))
        .collect();

    chart
        .draw_series(LineSeries::new(centers.iter().copied(), PATH_COLOR))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let radius = ((width.min(height) as f64 / n) * 0.2).clamp(2.0, 12.0) as i32;
    let len = centers.len();

    chart
        .draw_series(
            centers
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| Circle::new((x, y), radius, order_color(i, len).filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}
