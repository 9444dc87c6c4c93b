//! Elevation-profile legend drawn with plotters into an in-memory bitmap

use plotters::prelude::*;
use plotters::style::FontStyle;
use track_atlas_lib::{AtlasError, ChartRenderer, Raster, Result};

const PROFILE_COLOR: RGBColor = RGBColor(56, 150, 220);

fn chart_error(err: impl std::fmt::Display) -> AtlasError {
    AtlasError::ChartRender(err.to_string())
}

/// Renders the elevation profile of a page
///
/// Titles and axis labels need a registered font; without one only the mesh and the
/// profile area are drawn.
#[derive(Clone, Debug, Default)]
pub struct PlottersChart {
    labels: bool,
}

impl PlottersChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` as the sans-serif font used by every chart
    pub fn with_font(bytes: Vec<u8>) -> Result<Self> {
        // Registered fonts live for the rest of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
            .map_err(|_| AtlasError::InvalidFont("plotters rejected the font".to_string()))?;
        Ok(Self { labels: true })
    }

    fn draw(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
        x: &[f64],
        y: &[f64],
        title: &str,
        caption: &str,
    ) -> Result<()> {
        root.fill(&WHITE).map_err(chart_error)?;

        let x_max = x.last().copied().unwrap_or(0.0).max(0.1);
        let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
        let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (y_min, y_max) = if y_min.is_finite() && y_max.is_finite() {
            let pad = ((y_max - y_min) * 0.1).max(10.0);
            ((y_min - pad).max(0.0).min(y_min), y_max + pad)
        } else {
            (0.0, 100.0)
        };

        let mut builder = ChartBuilder::on(root);
        builder.margin(10);
        if self.labels {
            builder
                .caption(title, ("sans-serif", 22))
                .x_label_area_size(40)
                .y_label_area_size(50);
        }
        let mut chart = builder
            .build_cartesian_2d(0.0..x_max, y_min..y_max)
            .map_err(chart_error)?;

        if self.labels {
            chart
                .configure_mesh()
                .x_desc(caption)
                .y_desc("m")
                .x_label_formatter(&|km| format!("{km:.0}"))
                .y_label_formatter(&|m| format!("{m:.0}"))
                .draw()
                .map_err(chart_error)?;
        }

        chart
            .draw_series(
                AreaSeries::new(
                    x.iter().copied().zip(y.iter().copied()),
                    y_min,
                    PROFILE_COLOR.mix(0.3),
                )
                .border_style(PROFILE_COLOR.stroke_width(2)),
            )
            .map_err(chart_error)?;
        Ok(())
    }
}

impl ChartRenderer for PlottersChart {
    fn render_chart(
        &self,
        x: &[f64],
        y: &[f64],
        title: &str,
        caption: &str,
        size: (u32, u32),
    ) -> Result<Raster> {
        #[cfg(feature = "profiling")]
        profiling::scope!("chart::render_chart");

        let (width, height) = size;
        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            self.draw(&root, x, y, title, caption)?;
            root.present().map_err(chart_error)?;
        }
        Raster::from_raw(width, height, buffer)
            .ok_or_else(|| chart_error("bitmap buffer does not match the chart size"))
    }
}
