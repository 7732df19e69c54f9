//! Line-chart rendering for the trend handler.

use crate::error::{Ask360Error, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

/// Render the 2024 monthly sales trend as a PNG line chart.
///
/// `points` are (date label, sales in USD) pairs in month order. Sales are
/// plotted in millions.
pub fn render_trend_chart(points: &[(String, f64)], path: &Path) -> Result<()> {
    if points.is_empty() {
        return Err(Ask360Error::Chart(
            "cannot render an empty trend series".to_string(),
        ));
    }

    let y_max = points
        .iter()
        .map(|(_, v)| v / 1e6)
        .fold(0.0_f64, f64::max)
        * 1.1;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Sales Trend - 2024", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..(points.len() as i32 - 1), 0f64..y_max)
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Sales (Million USD)")
        .x_label_formatter(&|idx| {
            points
                .get(*idx as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default()
        })
        .draw()
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            points
                .iter()
                .enumerate()
                .map(|(i, (_, v))| (i as i32, v / 1e6)),
            &BLUE,
        ))
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;

    chart
        .draw_series(points.iter().enumerate().map(|(i, (_, v))| {
            Circle::new((i as i32, v / 1e6), 3, BLUE.filled())
        }))
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;

    root.present()
        .map_err(|e| Ask360Error::Chart(e.to_string()))?;
    debug!("Trend chart written to {}", path.display());

    Ok(())
}
