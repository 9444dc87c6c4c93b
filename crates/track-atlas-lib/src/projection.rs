//! Coordinate conversions: geodetic → Web Mercator → tile grid → page pixels

use crate::{BoundingBox, GeoPoint, ZoomLevel};
use geo::Point;

/// Web Mercator half-extent in meters (EPSG:3857), `π · 6378137`
pub const EARTH_MERCATOR_MAX: f64 = 20_037_508.342_789_244;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.051_128_78;

const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Project a point to Web Mercator meters
///
/// Latitude is clamped to the Mercator range.
#[inline]
pub fn to_mercator(point: GeoPoint) -> Point<f64> {
    let lat_rad = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = point.lon * LON_TO_X_FACTOR;
    let y = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() * Y_FACTOR;
    Point::new(x, y)
}

/// Inverse of [`to_mercator`]
#[inline]
pub fn from_mercator(x: f64, y: f64) -> GeoPoint {
    let lon = x / LON_TO_X_FACTOR;
    let lat = (std::f64::consts::FRAC_PI_2 - 2.0 * (-y / Y_FACTOR).exp().atan()).to_degrees();
    GeoPoint::new(lon, lat)
}

/// Inclusive rectangle of tile grid coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileSpan {
    pub col_min: i64,
    pub row_min: i64,
    pub col_max: i64,
    pub row_max: i64,
}

impl TileSpan {
    /// Span covering both tiles, whatever their order
    pub fn from_corners(a: (i64, i64), b: (i64, i64)) -> Self {
        Self {
            col_min: a.0.min(b.0),
            row_min: a.1.min(b.1),
            col_max: a.0.max(b.0),
            row_max: a.1.max(b.1),
        }
    }

    #[inline]
    pub fn col_count(&self) -> u32 {
        (self.col_max - self.col_min + 1) as u32
    }

    #[inline]
    pub fn row_count(&self) -> u32 {
        (self.row_max - self.row_min + 1) as u32
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.col_count() as usize * self.row_count() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canvas size in pixels for tiles of `tile_px`
    #[inline]
    pub fn pixel_size(&self, tile_px: u32) -> (u32, u32) {
        (self.col_count() * tile_px, self.row_count() * tile_px)
    }

    /// `(col, row)` pairs in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.row_min..=self.row_max)
            .flat_map(move |row| (self.col_min..=self.col_max).map(move |col| (col, row)))
    }

    /// Grow by `cols` tiles on the left and right and `rows` tiles on top and bottom
    pub fn widen(&self, cols: i64, rows: i64) -> Self {
        Self {
            col_min: self.col_min - cols,
            row_min: self.row_min - rows,
            col_max: self.col_max + cols,
            row_max: self.row_max + rows,
        }
    }
}

/// Tiles to stitch for one page and the page size they must cover
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageLayout {
    pub span: TileSpan,
    /// Printable page size in pixels, oriented like the span
    pub page_px: (u32, u32),
}

/// Maps geodetic points onto one zoom level's tile grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileProjector {
    zoom: ZoomLevel,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TileProjector {
    pub fn new(zoom: ZoomLevel) -> Self {
        Self { zoom }
    }

    #[inline]
    pub fn zoom(&self) -> &ZoomLevel {
        &self.zoom
    }

    /// Tile containing a Mercator position; rows grow southward
    #[inline]
    pub fn mercator_to_tile(&self, x: f64, y: f64) -> (i64, i64) {
        let (x0, y0) = self.zoom.origin();
        let tile_m = self.zoom.tile_size_m();
        (
            ((x - x0) / tile_m).floor() as i64,
            ((y0 - y) / tile_m).floor() as i64,
        )
    }

    /// Tile containing `point`
    #[inline]
    pub fn geo_to_tile(&self, point: GeoPoint) -> (i64, i64) {
        let merc = to_mercator(point);
        self.mercator_to_tile(merc.x(), merc.y())
    }

    /// Mercator position of the top-left corner of a tile
    #[inline]
    pub fn tile_to_mercator(&self, col: i64, row: i64) -> Point<f64> {
        let (x0, y0) = self.zoom.origin();
        let tile_m = self.zoom.tile_size_m();
        Point::new(x0 + col as f64 * tile_m, y0 - row as f64 * tile_m)
    }

    /// Geodetic position of the top-left corner of a tile
    #[inline]
    pub fn tile_to_geo(&self, col: i64, row: i64) -> GeoPoint {
        let merc = self.tile_to_mercator(col, row);
        from_mercator(merc.x(), merc.y())
    }

    /// Pixel offset of `point` inside its own tile, in `[0, tile_size)`
    pub fn offset_in_tile(&self, point: GeoPoint) -> (f64, f64) {
        let merc = to_mercator(point);
        let (col, row) = self.mercator_to_tile(merc.x(), merc.y());
        let corner = self.tile_to_mercator(col, row);
        let res = self.zoom.resolution_m_per_px();
        ((merc.x() - corner.x()) / res, (corner.y() - merc.y()) / res)
    }

    /// Tiles touched by a non-empty box, `None` for an empty one
    pub fn span_for_box(&self, bbox: &BoundingBox) -> Option<TileSpan> {
        let extent = bbox.extent()?;
        Some(TileSpan::from_corners(
            self.geo_to_tile(extent.northwest()),
            self.geo_to_tile(extent.southeast()),
        ))
    }

    /// Widen `span` symmetrically, by whole tiles, until it covers a page of `page_px`
    ///
    /// The page is turned to landscape when the span has more columns than rows. The
    /// returned layout carries the page size in that orientation.
    pub fn fit_span_to_page(&self, span: TileSpan, page_px: (u32, u32)) -> PageLayout {
        let (short, long) = (page_px.0.min(page_px.1), page_px.0.max(page_px.1));
        let page_px = if span.col_count() > span.row_count() {
            (long, short)
        } else {
            (short, long)
        };

        let tile_px = f64::from(self.zoom.tile_size_px());
        let (w, h) = span.pixel_size(self.zoom.tile_size_px());
        let missing = |target: u32, have: u32| -> i64 {
            if target > have {
                (f64::from(target - have) / (2.0 * tile_px)).ceil() as i64
            } else {
                0
            }
        };
        PageLayout {
            span: span.widen(missing(page_px.0, w), missing(page_px.1, h)),
            page_px,
        }
    }

    /// Pixel frame of the canvas stitched from `span`
    pub fn frame(&self, span: &TileSpan) -> PixelFrame {
        let top_left = self.tile_to_mercator(span.col_min, span.row_min);
        let bottom_right = self.tile_to_mercator(span.col_max + 1, span.row_max + 1);
        let (width, height) = span.pixel_size(self.zoom.tile_size_px());
        PixelFrame {
            origin_x: top_left.x(),
            origin_y: top_left.y(),
            extent_x: bottom_right.x() - top_left.x(),
            extent_y: top_left.y() - bottom_right.y(),
            canvas_width: width,
            canvas_height: height,
            offset_x: 0,
            offset_y: 0,
            width,
            height,
        }
    }
}

/// Affine map from Mercator meters to the pixels of a (possibly cropped) canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelFrame {
    origin_x: f64,
    origin_y: f64,
    extent_x: f64,
    extent_y: f64,
    canvas_width: u32,
    canvas_height: u32,
    offset_x: u32,
    offset_y: u32,
    width: u32,
    height: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PixelFrame {
    /// Visible size in pixels
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Top-left corner of the visible window inside the full canvas
    #[inline]
    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }

    /// Pixel position of `point`, relative to the visible window
    #[inline]
    pub fn to_pixel(&self, point: GeoPoint) -> (f64, f64) {
        let merc = to_mercator(point);
        let x = f64::from(self.canvas_width) * (merc.x() - self.origin_x) / self.extent_x;
        let y = f64::from(self.canvas_height) * (self.origin_y - merc.y()) / self.extent_y;
        (x - f64::from(self.offset_x), y - f64::from(self.offset_y))
    }

    /// Whether a pixel position lies inside the visible window
    #[inline]
    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= 0.0 && y >= 0.0 && x < f64::from(self.width) && y < f64::from(self.height)
    }

    /// Window of at most `width` x `height` pixels centered on `center`, shifted as
    /// needed to stay inside the canvas
    pub fn crop_around(&self, center: (f64, f64), width: u32, height: u32) -> PixelFrame {
        let width = width.min(self.canvas_width);
        let height = height.min(self.canvas_height);
        let place = |center: f64, size: u32, canvas: u32| -> u32 {
            let start = (center - f64::from(size) / 2.0).round().max(0.0) as u32;
            start.min(canvas - size)
        };
        // Centers are given relative to the current window
        let cx = center.0 + f64::from(self.offset_x);
        let cy = center.1 + f64::from(self.offset_y);
        PixelFrame {
            offset_x: place(cx, width, self.canvas_width),
            offset_y: place(cy, height, self.canvas_height),
            width,
            height,
            ..*self
        }
    }

    /// Window of at most `width` x `height` pixels centered on the canvas
    pub fn centered_crop(&self, width: u32, height: u32) -> PixelFrame {
        let width = width.min(self.canvas_width);
        let height = height.min(self.canvas_height);
        PixelFrame {
            offset_x: (self.canvas_width - width) / 2,
            offset_y: (self.canvas_height - height) / 2,
            width,
            height,
            ..*self
        }
    }
}
