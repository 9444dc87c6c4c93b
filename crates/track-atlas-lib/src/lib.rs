//! Track Atlas Library - Printable Map Pages from Long GPS Tracks
//!
//! This library splits a long track into page-sized chunks and renders each chunk as a
//! map sheet: a base raster stitched from map tiles, the track line with distance ticks,
//! and an elevation-profile legend placed where it hides the least of the track.
//!
//! # Architecture
//!
//! - **[`GeoPoint`]** / **[`BoundingBox`]**: Spherical geodesy and geodesic envelopes
//! - **[`PageFormat`]** / **[`ZoomLevel`]**: Paper size and tile-matrix scale models
//! - **[`PathSegmenter`]**: Greedy partition of a path into page-sized [`Segment`]s
//! - **[`TileProjector`]**: Geodetic → Web Mercator → tile grid → page pixels
//! - **[`TileCompositor`]**: Stitches fetched tiles into one canvas, tolerating failures
//! - **[`TrackOverlay`]** / **[`LegendPlacer`]**: Track line, ticks and legend corner
//! - **[`PageRenderer`]**: Per-segment pipeline tying everything to the collaborators
//!
//! Network access, chart drawing and file formats stay behind the traits in [`sources`].

mod bbox;
mod compositor;
mod config;
mod format;
mod geo_point;
mod legend;
mod overlay;
mod page;
mod places;
mod profile;
mod projection;
pub mod raster;
mod segmenter;
pub mod sources;
mod track;
mod zoom;

// Public API exports
pub use bbox::BoundingBox;
pub use compositor::{BLANK_TILE, Composite, TileCompositor};
pub use config::Config;
pub use format::{LengthUnit, PageFormat};
pub use geo_point::{EARTH_RADIUS_KM, GeoPoint};
pub use legend::{Corner, LegendPlacer};
pub use overlay::{TrackLine, TrackOverlay};
pub use page::{PageRenderer, RenderedPage, index_text};
pub use places::{Place, PlaceKind, SegmentNames, encode_name};
pub use profile::{ElevationProfile, cumulative_distances};
pub use projection::{
    PageLayout, PixelFrame, TileProjector, TileSpan, from_mercator, to_mercator,
};
pub use segmenter::{PathSegmenter, Segment};
pub use sources::{ChartRenderer, ElevationSource, PlaceSource, Raster, TileSource};
pub use track::{Track, read_track};
pub use zoom::ZoomLevel;

/// Error types for the atlas pipeline
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Empty track")]
    EmptyTrack,

    #[error("Tile ({col}, {row}) at level {level} unavailable: {reason}")]
    TileUnavailable {
        col: i64,
        row: i64,
        level: u8,
        reason: String,
    },

    #[error("Elevation service error: {0}")]
    ElevationUnavailable(String),

    #[error("Elevation count mismatch: expected {expected}, got {actual}")]
    ElevationMismatch { expected: usize, actual: usize },

    #[error("Place service error: {0}")]
    PlacesUnavailable(String),

    #[error("Chart rendering error: {0}")]
    ChartRender(String),

    #[error("Format {0} has no DPI bound")]
    MissingDpi(String),

    #[error("Invalid page format: {0}")]
    InvalidFormat(String),

    #[error("Invalid font: {0}")]
    InvalidFont(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
