//! Greedy partition of a path into page-sized segments
//!
//! The segmenter walks the path once. Points are accumulated into a bounding box for
//! as long as the box still fits strictly inside the printable ground area of one page
//! (page extent minus margin). The first point that would overflow closes the segment
//! and opens the next one, so consecutive segments share that boundary point.

use crate::format::LengthUnit;
use crate::projection::{MAX_LATITUDE, PageLayout, TileProjector, TileSpan};
use crate::{BoundingBox, GeoPoint, PageFormat, ZoomLevel};
use std::sync::OnceLock;

/// One page worth of path
#[derive(Clone, Debug)]
pub struct Segment<'a> {
    /// Position in the segment sequence, starting at 0
    pub index: usize,
    /// `raw_box` expanded to the page aspect ratio
    pub fitted_box: BoundingBox,
    /// Tight envelope of the points committed during segmentation
    pub raw_box: BoundingBox,
    /// First path index covered by this segment
    pub start_idx: usize,
    /// Last path index covered by this segment (inclusive)
    pub end_idx: usize,
    path: &'a [GeoPoint],
    layout: OnceLock<PageLayout>,
}

impl<'a> Segment<'a> {
    /// Points `start_idx..=end_idx` of the path
    #[inline]
    pub fn points(&self) -> &'a [GeoPoint] {
        &self.path[self.start_idx..=self.end_idx]
    }

    /// The whole path this segment indexes into
    #[inline]
    pub fn path(&self) -> &'a [GeoPoint] {
        self.path
    }

    #[inline]
    pub fn start_point(&self) -> GeoPoint {
        self.path[self.start_idx]
    }

    #[inline]
    pub fn end_point(&self) -> GeoPoint {
        self.path[self.end_idx]
    }

    /// Tiles covering the fitted box, widened to cover a page of `page_px`
    ///
    /// Computed on first use and cached; later calls return the cached layout whatever
    /// their arguments.
    pub fn layout(&self, projector: &TileProjector, page_px: (u32, u32)) -> PageLayout {
        *self.layout.get_or_init(|| {
            let span = projector.span_for_box(&self.fitted_box).unwrap_or_else(|| {
                let tile = projector.geo_to_tile(self.start_point());
                TileSpan::from_corners(tile, tile)
            });
            projector.fit_span_to_page(span, page_px)
        })
    }
}

/// Splits paths into [`Segment`]s for one page format and zoom level
#[derive(Clone, Debug)]
pub struct PathSegmenter {
    format: PageFormat,
    zoom: ZoomLevel,
    margin_cm: f64,
    border_px: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PathSegmenter {
    /// # Arguments
    /// * `format` - Paper format; when it has a DPI bound, pixels are printed at that DPI
    /// * `zoom` - Tile-matrix level the pages are drawn at
    /// * `margin_cm` - Paper margin kept free around the track, in centimeters
    pub fn new(format: PageFormat, zoom: ZoomLevel, margin_cm: f64) -> Self {
        Self {
            format,
            zoom,
            margin_cm,
            border_px: 0,
        }
    }

    /// Leave a frame of `border_px` pixels around each page out of the drawable area
    pub fn with_border_px(mut self, border_px: u32) -> Self {
        self.border_px = border_px;
        self
    }

    #[inline]
    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    #[inline]
    pub fn zoom(&self) -> &ZoomLevel {
        &self.zoom
    }

    /// Ground `(width, height, margin)` of the drawable part of one page, in kilometers
    /// at the equator
    pub fn page_extent_km(&self) -> (f64, f64, f64) {
        let zoom = match self.format.dpi() {
            Some(dpi) => self.zoom.with_print_dpi(dpi),
            None => self.zoom,
        };
        let frame_cm = LengthUnit::convert(
            2.0 * f64::from(self.border_px) * zoom.pixel_pitch_m(),
            LengthUnit::Meter,
            LengthUnit::Centimeter,
        );
        let (w, h) = self.format.cm();
        zoom.rescale(
            (w - frame_cm).max(0.0),
            (h - frame_cm).max(0.0),
            self.margin_cm,
            LengthUnit::Centimeter,
            LengthUnit::Kilometer,
        )
    }

    /// Ground extent of one page drawn around latitude `lat`
    ///
    /// A Mercator pixel covers `cos(lat)` times the ground it covers at the equator.
    pub fn page_extent_km_at(&self, lat: f64) -> (f64, f64, f64) {
        let (w, h, m) = self.page_extent_km();
        let k = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos();
        (w * k, h * k, m * k)
    }

    /// Partition `path` into consecutive segments
    ///
    /// Page extents are evaluated at the latitude of each segment's first point.
    /// Every index is covered, the last point of a segment is the first point of
    /// the next one, and an empty path yields no segment.
    pub fn segment<'a>(&self, path: &'a [GeoPoint]) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut curr = 0;
        while curr < path.len() {
            let start = curr;
            let (width, height, margin) = self.page_extent_km_at(path[start].lat);
            let (max_dim, min_dim) = (width.max(height) - margin, width.min(height) - margin);
            let mut raw_box = BoundingBox::new();
            while curr < path.len() {
                let candidate = raw_box.union_with_point(path[curr]);
                // A segment always takes its first point, even when that alone overflows
                if !raw_box.is_empty() && !candidate.fits_within(max_dim, min_dim) {
                    break;
                }
                raw_box = candidate;
                curr += 1;
            }

            let end = curr.min(path.len() - 1);
            let fitted_box = raw_box.expand_to(width, height);
            tracing::debug!(
                index = segments.len(),
                start,
                end,
                width_km = fitted_box.width_km(),
                height_km = fitted_box.height_km(),
                "Segment closed"
            );
            segments.push(Segment {
                index: segments.len(),
                fitted_box,
                raw_box,
                start_idx: start,
                end_idx: end,
                path,
                layout: OnceLock::new(),
            });
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meander(n: usize, length_km: f64) -> Vec<GeoPoint> {
        let origin = GeoPoint::new(2.8, 47.9);
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                let along = origin.move_east(t * length_km);
                along.move_north((t * 12.0).sin() * 0.4)
            })
            .collect()
    }

    fn segmenter() -> PathSegmenter {
        PathSegmenter::new(
            PageFormat::a4().with_dpi(150.0),
            ZoomLevel::new(15, 1.0, 256, (0.0, 0.0)),
            0.5,
        )
    }

    #[test]
    fn test_empty_path() {
        assert!(segmenter().segment(&[]).is_empty());
    }

    #[test]
    fn test_single_point() {
        let path = [GeoPoint::new(1.0, 45.0)];
        let segments = segmenter().segment(&path);
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start_idx, segments[0].end_idx), (0, 0));
        assert_eq!(segments[0].points(), &path[..]);
    }

    #[test]
    fn test_repeated_point_is_one_segment() {
        let path = vec![GeoPoint::new(1.0, 45.0); 50];
        let segments = segmenter().segment(&path);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_idx, 49);
        let (w, h, _) = segmenter().page_extent_km_at(45.0);
        assert!((segments[0].fitted_box.width_km() - w).abs() < 1e-3);
        assert!((segments[0].fitted_box.height_km() - h).abs() < 1e-3);
    }

    #[test]
    fn test_coverage_with_shared_boundaries() {
        let path = meander(2000, 15.0);
        let segments = segmenter().segment(&path);
        assert!(segments.len() >= 2);

        assert_eq!(segments[0].start_idx, 0);
        assert_eq!(segments.last().unwrap().end_idx, path.len() - 1);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_idx, pair[1].start_idx);
            assert!(pair[0].start_idx < pair[1].start_idx);
        }
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.index, i);
        }
    }

    #[test]
    fn test_raw_box_fits_and_is_contained() {
        let segmenter = segmenter();
        let path = meander(2000, 15.0);
        for segment in segmenter.segment(&path) {
            let (w, h, m) = segmenter.page_extent_km_at(segment.start_point().lat);
            assert!(segment.raw_box.fits_within(w - m, h - m));
            for point in &path[segment.start_idx..segment.end_idx] {
                assert!(segment.raw_box.contains(*point));
                assert!(segment.fitted_box.contains(*point));
            }
        }
    }

    #[test]
    fn test_oversized_first_point_is_still_taken() {
        // Margin larger than the page: nothing fits, every segment holds one point
        let segmenter = PathSegmenter::new(
            PageFormat::a4().with_dpi(150.0),
            ZoomLevel::new(15, 1.0, 256, (0.0, 0.0)),
            40.0,
        );
        let path = meander(5, 1.0);
        let segments = segmenter.segment(&path);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[4].start_idx, 4);
        assert_eq!(segments[4].end_idx, 4);
    }

    #[test]
    fn test_page_extent_shrinks_with_latitude() {
        let segmenter = segmenter();
        let (w0, h0, m0) = segmenter.page_extent_km();
        assert_eq!(segmenter.page_extent_km_at(0.0), (w0, h0, m0));
        // 1 m/px at 150 DPI: 21 cm of paper is 1240 px
        assert!((w0 - 0.21 / 0.0254 * 150.0 / 1000.0).abs() < 1e-9);
        let (w60, h60, _) = segmenter.page_extent_km_at(60.0);
        assert!((w60 - w0 / 2.0).abs() < 1e-9);
        assert!((h60 - h0 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_border_is_taken_off_the_page() {
        let plain = segmenter();
        let framed = segmenter().with_border_px(20);
        let (w0, h0, m0) = plain.page_extent_km();
        let (w, h, m) = framed.page_extent_km();
        // 1 m/px: a 20 px frame on both sides removes 40 m per axis
        assert!((w0 - w - 0.04).abs() < 1e-9);
        assert!((h0 - h - 0.04).abs() < 1e-9);
        assert_eq!(m, m0);
    }

    #[test]
    fn test_layout_is_cached() {
        let path = meander(200, 1.0);
        let segments = segmenter().segment(&path);
        let projector = TileProjector::new(ZoomLevel::web_mercator(15));
        let first = segments[0].layout(&projector, (1200, 1700));
        let again = segments[0].layout(&projector, (10, 10));
        assert_eq!(first, again);
        let (w, h) = first.span.pixel_size(256);
        assert!(w >= first.page_px.0 && h >= first.page_px.1);
    }
}
