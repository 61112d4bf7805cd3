//! Static Chart Renderer
//! Draws a chart description as an SVG line chart.
//!
//! Layout:
//! 1. x-axis: date, y-axis: price
//! 2. One coloured line per city
//! 3. Legend in the upper right, one entry per city

use crate::charts::ChartPlotter;
use crate::data::ChartDescription;
use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

fn drawing_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Drawing(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `chart` into an SVG document of the given pixel size.
    pub fn render_svg(chart: &ChartDescription, size: (u32, u32)) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_error)?;

            let bounds = ChartPlotter::axis_bounds(chart);
            let has_data = !chart.is_empty();

            let mut ctx = ChartBuilder::on(&root)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(bounds.x, bounds.y)
                .map_err(drawing_error)?;

            ctx.configure_mesh()
                .x_desc("Date")
                .y_desc("Price")
                .x_labels(8)
                .x_label_formatter(&|day| {
                    if has_data {
                        ChartPlotter::format_day(*day)
                    } else {
                        String::new()
                    }
                })
                .y_label_formatter(&|price| format!("{:.2}", price))
                .draw()
                .map_err(drawing_error)?;

            for (i, series) in chart.series.iter().enumerate() {
                let color = ChartPlotter::series_color(i);
                ctx.draw_series(LineSeries::new(
                    series
                        .points
                        .iter()
                        .map(|p| (ChartPlotter::day_number(p.date), p.price)),
                    color.stroke_width(2),
                ))
                .map_err(drawing_error)?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }

            if has_data {
                ctx.configure_series_labels()
                    .position(SeriesLabelPosition::UpperRight)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(drawing_error)?;
            }

            root.present().map_err(drawing_error)?;
        }
        Ok(svg)
    }
}
