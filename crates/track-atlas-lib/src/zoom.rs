//! Tile-matrix zoom levels and the paper-to-ground scale model

use crate::format::LengthUnit;
use crate::projection::EARTH_MERCATOR_MAX;

/// Physical size of one rendered pixel when no print DPI is bound (OGC standard, 0.28 mm)
pub const STANDARD_PIXEL_PITCH_M: f64 = 0.28e-3;

const METERS_PER_INCH: f64 = 0.0254;
const WEB_MERCATOR_TILE_PX: u32 = 256;

/// One level of a tile matrix
///
/// A level is defined by its ground resolution (meters of Mercator ground per pixel),
/// its tile size in pixels and the Mercator coordinates of the matrix's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomLevel {
    level: u8,
    resolution_m_per_px: f64,
    tile_size_px: u32,
    origin: (f64, f64),
    pixel_pitch_m: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ZoomLevel {
    /// Build a custom level
    ///
    /// # Arguments
    /// * `level` - Level number, used only to address tiles
    /// * `resolution_m_per_px` - Ground meters covered by one pixel
    /// * `tile_size_px` - Width and height of a tile in pixels
    /// * `origin` - Mercator `(x0, y0)` of the top-left corner of tile `(0, 0)`
    pub fn new(level: u8, resolution_m_per_px: f64, tile_size_px: u32, origin: (f64, f64)) -> Self {
        Self {
            level,
            resolution_m_per_px,
            tile_size_px,
            origin,
            pixel_pitch_m: STANDARD_PIXEL_PITCH_M,
        }
    }

    /// Standard Web-Mercator level (256 px tiles, origin at the north-west corner of the world)
    pub fn web_mercator(level: u8) -> Self {
        let world = 2.0 * EARTH_MERCATOR_MAX;
        let resolution = world / (f64::from(WEB_MERCATOR_TILE_PX) * 2f64.powi(i32::from(level)));
        Self::new(
            level,
            resolution,
            WEB_MERCATOR_TILE_PX,
            (-EARTH_MERCATOR_MAX, EARTH_MERCATOR_MAX),
        )
    }

    /// Same level, with pixels printed at `dpi`
    pub fn with_print_dpi(self, dpi: f64) -> Self {
        Self {
            pixel_pitch_m: METERS_PER_INCH / dpi,
            ..self
        }
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[inline]
    pub fn resolution_m_per_px(&self) -> f64 {
        self.resolution_m_per_px
    }

    #[inline]
    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    #[inline]
    pub fn pixel_pitch_m(&self) -> f64 {
        self.pixel_pitch_m
    }

    /// Mercator meters covered by one tile
    #[inline]
    pub fn tile_size_m(&self) -> f64 {
        f64::from(self.tile_size_px) * self.resolution_m_per_px
    }

    /// Ground extent covered by a page printed at this level
    ///
    /// Converts the paper size and margin from `unit` into pixels at the bound pixel
    /// pitch, then into ground distance at this level's resolution, expressed in
    /// `target_unit`. Returns `(width, height, margin)`.
    pub fn rescale(
        &self,
        page_width: f64,
        page_height: f64,
        margin: f64,
        unit: LengthUnit,
        target_unit: LengthUnit,
    ) -> (f64, f64, f64) {
        let scale = self.resolution_m_per_px / self.pixel_pitch_m;
        let ground = |value: f64| {
            let paper_m = LengthUnit::convert(value, unit, LengthUnit::Meter);
            LengthUnit::convert(paper_m * scale, LengthUnit::Meter, target_unit)
        };
        (ground(page_width), ground(page_height), ground(margin))
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::web_mercator(15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_mercator_resolution() {
        let z0 = ZoomLevel::web_mercator(0);
        assert!((z0.resolution_m_per_px() - 156_543.03).abs() < 0.01);
        assert!((z0.tile_size_m() - 2.0 * EARTH_MERCATOR_MAX).abs() < 1e-6);

        let z15 = ZoomLevel::web_mercator(15);
        assert!((z15.resolution_m_per_px() - 4.777).abs() < 1e-3);
        assert_eq!(z15.level(), 15);
        assert_eq!(z15.tile_size_px(), 256);
        assert_eq!(z15.origin(), (-EARTH_MERCATOR_MAX, EARTH_MERCATOR_MAX));
    }

    #[test]
    fn test_rescale_matches_rendered_pixels() {
        // 1 m/px printed at 150 dpi: an A4 width of 21 cm is 1240.16 px, so 1.24 km
        let zoom = ZoomLevel::new(0, 1.0, 256, (0.0, 0.0)).with_print_dpi(150.0);
        let (w, h, m) = zoom.rescale(
            21.0,
            29.7,
            0.5,
            LengthUnit::Centimeter,
            LengthUnit::Kilometer,
        );
        assert!((w - 21.0 / 2.54 * 150.0 / 1000.0).abs() < 1e-9);
        assert!((h - 29.7 / 2.54 * 150.0 / 1000.0).abs() < 1e-9);
        assert!((m - 0.5 / 2.54 * 150.0 / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_standard_pitch() {
        let zoom = ZoomLevel::new(0, 2.0, 256, (0.0, 0.0));
        // 28 cm of paper at 0.28 mm per pixel is 1000 px, so 2 km at 2 m/px
        let (w, _, _) = zoom.rescale(28.0, 28.0, 0.0, LengthUnit::Centimeter, LengthUnit::Kilometer);
        assert!((w - 2.0).abs() < 1e-9);

        let (w_m, _, _) = zoom.rescale(280.0, 280.0, 0.0, LengthUnit::Millimeter, LengthUnit::Meter);
        assert!((w_m - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescale_scales_linearly_with_level() {
        let coarse = ZoomLevel::web_mercator(14);
        let fine = ZoomLevel::web_mercator(15);
        let (wc, _, _) = coarse.rescale(21.0, 29.7, 0.0, LengthUnit::Centimeter, LengthUnit::Kilometer);
        let (wf, _, _) = fine.rescale(21.0, 29.7, 0.0, LengthUnit::Centimeter, LengthUnit::Kilometer);
        assert!((wc / wf - 2.0).abs() < 1e-9);
    }
}
