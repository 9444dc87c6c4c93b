//! Collaborators the pipeline depends on but does not implement
//!
//! Tile servers, elevation services, place databases and chart drawing are reached
//! only through these traits. Implementations must be shareable across threads since
//! segments and tiles are processed in parallel.

use crate::{BoundingBox, Place, Result};

/// RGB raster used for tiles, charts and pages
pub type Raster = image::RgbImage;

/// Fetches one map tile
pub trait TileSource: Send + Sync {
    /// Fetch tile `(col, row)` of `layer` at `level`
    ///
    /// Missing or unreadable tiles should be reported as
    /// [`AtlasError::TileUnavailable`](crate::AtlasError::TileUnavailable).
    fn fetch_tile(&self, col: i64, row: i64, layer: &str, level: u8) -> Result<Raster>;
}

impl<F> TileSource for F
where
    F: Fn(i64, i64, &str, u8) -> Result<Raster> + Send + Sync,
{
    fn fetch_tile(&self, col: i64, row: i64, layer: &str, level: u8) -> Result<Raster> {
        self(col, row, layer, level)
    }
}

/// Looks up terrain elevations
pub trait ElevationSource: Send + Sync {
    /// Elevations in meters for parallel `lons`/`lats` arrays, same length and order
    fn fetch_elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>>;
}

impl<F> ElevationSource for F
where
    F: Fn(&[f64], &[f64]) -> Result<Vec<f64>> + Send + Sync,
{
    fn fetch_elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>> {
        self(lons, lats)
    }
}

/// Finds named places inside a box
pub trait PlaceSource: Send + Sync {
    fn fetch_places(&self, bbox: &BoundingBox) -> Result<Vec<Place>>;
}

/// Draws the elevation-profile chart used as page legend
pub trait ChartRenderer: Send + Sync {
    /// Render `y` against `x` into a raster of exactly `size` pixels
    fn render_chart(
        &self,
        x: &[f64],
        y: &[f64],
        title: &str,
        caption: &str,
        size: (u32, u32),
    ) -> Result<Raster>;
}
