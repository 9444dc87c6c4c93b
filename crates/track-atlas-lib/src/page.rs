//! Per-segment rendering pipeline
//!
//! For each segment: elevation profile → place names → tile layout → stitched canvas →
//! crop to the page → track line and ticks → legend corner → chart → border.

use crate::raster::{add_border, crop, draw_ticks, draw_track, paste};
use crate::{
    ChartRenderer, Config, Corner, ElevationProfile, ElevationSource, GeoPoint, LegendPlacer,
    PathSegmenter, PlaceSource, Raster, Result, Segment, SegmentNames, TileCompositor,
    TileProjector, TileSource, TrackOverlay, encode_name,
};
use ab_glyph::FontArc;
use image::{Rgb, Rgba, imageops};
use rayon::prelude::*;
use std::time::Instant;

const BORDER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// One finished map page
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// Index of the segment the page was rendered from
    pub index: usize,
    /// Human-readable title, e.g. `Stage 03: Gien`
    pub name: String,
    /// `name` made safe for file names
    pub encoded_name: String,
    pub description: String,
    pub profile: ElevationProfile,
    pub legend_corner: Corner,
    /// Path points drawn on the page
    pub track_points: usize,
    /// Distance ticks drawn on the page
    pub ticks: usize,
    /// Tiles replaced by blank placeholders
    pub missing_tiles: usize,
    pub image: Raster,
}

/// Renders segments into pages using the configured collaborators
pub struct PageRenderer<'a> {
    config: Config,
    projector: TileProjector,
    printable_px: (u32, u32),
    tiles: &'a dyn TileSource,
    elevations: &'a dyn ElevationSource,
    places: &'a dyn PlaceSource,
    chart: &'a dyn ChartRenderer,
    font: Option<FontArc>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> PageRenderer<'a> {
    /// # Errors
    /// Fails when the configured page format cannot be parsed.
    pub fn new(
        config: Config,
        tiles: &'a dyn TileSource,
        elevations: &'a dyn ElevationSource,
        places: &'a dyn PlaceSource,
        chart: &'a dyn ChartRenderer,
    ) -> Result<Self> {
        let printable_px = config.printable_px()?;
        Ok(Self {
            projector: TileProjector::new(config.zoom()),
            printable_px,
            config,
            tiles,
            elevations,
            places,
            chart,
            font: None,
        })
    }

    /// Label ticks with their distance using `font`
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Segmenter matching this renderer's format, zoom, margin and border
    pub fn segmenter(&self) -> Result<PathSegmenter> {
        Ok(PathSegmenter::new(
            self.config.page_format()?,
            self.config.zoom(),
            self.config.margin_cm,
        )
        .with_border_px(self.config.border_px))
    }

    /// Segment `path` and render every segment
    pub fn render_path(&self, path: &[GeoPoint]) -> Result<Vec<RenderedPage>> {
        let segments = self.segmenter()?.segment(path);
        tracing::info!(
            points = path.len(),
            segments = segments.len(),
            "Path segmented"
        );
        self.render_all(&segments)
    }

    /// Render segments in parallel, keeping their order
    ///
    /// The first failing segment aborts the whole batch.
    pub fn render_all(&self, segments: &[Segment<'_>]) -> Result<Vec<RenderedPage>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("page::render_all");

        segments
            .par_iter()
            .map(|segment| self.render_segment(segment))
            .collect()
    }

    /// Render one segment into a finished page
    ///
    /// Tile failures are tolerated; elevation, place and chart failures are returned.
    pub fn render_segment(&self, segment: &Segment<'_>) -> Result<RenderedPage> {
        #[cfg(feature = "profiling")]
        profiling::scope!("page::render_segment");
        let started = Instant::now();
        let path = segment.path();

        let profile = ElevationProfile::build(
            path,
            segment.start_idx,
            segment.end_idx,
            self.config.profile_stride,
            self.config.distance_calibration,
            self.elevations,
        )?;

        let radius = self.config.place_radius_km;
        let places = self
            .places
            .fetch_places(&segment.fitted_box.expand(radius, radius))?;
        let names = SegmentNames::resolve(&places, segment.start_point(), segment.end_point());
        let name = names.title(segment.index);

        let layout = segment.layout(&self.projector, self.printable_px);
        let (page_w, page_h) = layout.page_px;
        let composite = TileCompositor::new(
            self.tiles,
            self.config.layer.as_str(),
            self.projector.zoom().level(),
            self.projector.zoom().tile_size_px(),
        )
        .compose(&layout.span);

        let full = self.projector.frame(&layout.span);
        let center = segment
            .fitted_box
            .extent()
            .map(|extent| extent.center())
            .unwrap_or_else(|| segment.start_point());
        let frame = full.crop_around(full.to_pixel(center), page_w, page_h);
        let mut canvas = crop(&composite.image, frame.offset(), frame.size());

        let overlay = TrackOverlay::new(frame);
        let anchor = overlay
            .first_visible(path, segment.start_idx, segment.end_idx)
            .unwrap_or(segment.start_idx);
        let line = overlay.project(path, anchor, &profile, self.config.tick_step_km);
        let color = Rgba(self.config.line_color);
        draw_track(&mut canvas, &line.points, color, self.config.line_width);
        draw_ticks(
            &mut canvas,
            &line.ticks,
            color,
            self.config.tick_radius,
            self.font.as_ref(),
        );

        let canvas_size = canvas.dimensions();
        let (legend_w, legend_h) = self.config.legend_size(canvas_size.0.min(canvas_size.1));
        let legend_size = (legend_w.min(canvas_size.0), legend_h.min(canvas_size.1));
        let corner = LegendPlacer::new(legend_size).place(canvas_size, &line.points);

        let mut legend = self.chart.render_chart(
            &profile.distances_km,
            &profile.elevations_m,
            &name,
            &profile.statistics(),
            legend_size,
        )?;
        if legend.dimensions() != legend_size {
            legend = imageops::resize(
                &legend,
                legend_size.0,
                legend_size.1,
                imageops::FilterType::Triangle,
            );
        }
        paste(&mut canvas, &legend, corner.origin(canvas_size, legend_size));

        let image = add_border(&canvas, self.config.border_px, BORDER_COLOR);

        tracing::debug!(
            index = segment.index,
            name = %name,
            visible_points = line.points.len(),
            ticks = line.ticks.len(),
            corner = ?corner,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Page rendered"
        );

        Ok(RenderedPage {
            index: segment.index,
            encoded_name: encode_name(&name),
            description: names.description(&profile),
            name,
            profile,
            legend_corner: corner,
            track_points: line.points.len(),
            ticks: line.ticks.len(),
            missing_tiles: composite.missing.len(),
            image,
        })
    }
}

/// Plain-text index of rendered pages: title, then description, one block per page
pub fn index_text(pages: &[RenderedPage]) -> String {
    pages
        .iter()
        .map(|page| format!("{}\n--\n{}\n", page.name, page.description))
        .collect::<Vec<_>>()
        .join("\n")
}
