//! Rendering configuration shared by the segmenter and the page pipeline

use crate::raster::TRACK_COLOR;
use crate::{PageFormat, Result, ZoomLevel};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for segmenting a track and rendering its pages
///
/// Every field has a default, so a partial configuration file only needs the values
/// it changes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Paper format: a preset (`A4`, `letter`, ...) or a custom size like `21x29.7cm`.
    /// Default: A4
    pub format: String,
    /// Print resolution in dots per inch (default 150)
    pub dpi: f64,
    /// Level on the Web-Mercator tile matrix (default 15)
    pub zoom_level: u8,
    /// Margin kept free around the track on each page, in centimeters (default 0.5)
    pub margin_cm: f64,
    /// White frame added around each page, in pixels (default 20)
    pub border_px: u32,
    /// Tile layer name handed to the tile source (default "default")
    pub layer: String,
    /// Distance between two ticks along the track, in kilometers (default 10)
    pub tick_step_km: f64,
    /// One in every `profile_stride` points is sampled for the elevation profile (default 10)
    pub profile_stride: usize,
    /// Multiplier applied to measured distances; 1.0 keeps raw geodesic distances
    pub distance_calibration: f64,
    /// Extra distance around a page searched for place names, in kilometers (default 1)
    pub place_radius_km: f64,
    /// Legend width as a fraction of the page's short side (default 960/1832)
    pub legend_width_ratio: f64,
    /// Legend height as a fraction of its width (default 5/12)
    pub legend_aspect: f64,
    /// RGBA colour of the track line and ticks
    pub line_color: [u8; 4],
    /// Track line width in pixels (default 12)
    pub line_width: f32,
    /// Tick disc radius in pixels (default 12)
    pub tick_radius: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: "A4".to_string(),
            dpi: 150.0,
            zoom_level: 15,
            margin_cm: 0.5,
            border_px: 20,
            layer: "default".to_string(),
            tick_step_km: 10.0,
            profile_stride: 10,
            distance_calibration: 1.0,
            place_radius_km: 1.0,
            legend_width_ratio: 960.0 / 1832.0,
            legend_aspect: 5.0 / 12.0,
            line_color: TRACK_COLOR.0,
            line_width: 12.0,
            tick_radius: 12,
        }
    }
}

impl Config {
    /// Parsed paper format bound to [`Config::dpi`]
    pub fn page_format(&self) -> Result<PageFormat> {
        Ok(self.format.parse::<PageFormat>()?.with_dpi(self.dpi))
    }

    /// Web-Mercator level for [`Config::zoom_level`]
    pub fn zoom(&self) -> ZoomLevel {
        ZoomLevel::web_mercator(self.zoom_level)
    }

    /// Page size in pixels without the border, portrait
    pub fn printable_px(&self) -> Result<(u32, u32)> {
        let (w, h) = self.page_format()?.require_px()?;
        let frame = 2 * self.border_px;
        Ok((w.saturating_sub(frame), h.saturating_sub(frame)))
    }

    /// Legend size for a page whose short side is `short_side` pixels
    pub fn legend_size(&self, short_side: u32) -> (u32, u32) {
        let width = (f64::from(short_side) * self.legend_width_ratio).floor();
        let height = (width * self.legend_aspect).floor();
        (width as u32, height as u32)
    }
}
