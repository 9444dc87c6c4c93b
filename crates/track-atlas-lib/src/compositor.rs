//! Stitching of fetched tiles into one canvas

use crate::{AtlasError, Raster, TileSource, TileSpan};
use image::{Rgb, imageops};
use rayon::prelude::*;

/// Colour of the placeholder drawn where a tile could not be fetched
pub const BLANK_TILE: Rgb<u8> = Rgb([255, 255, 255]);

/// Stitched canvas plus the tiles that had to be replaced by placeholders
#[derive(Clone, Debug)]
pub struct Composite {
    pub image: Raster,
    /// `(col, row)` of every missing tile, in row-major order
    pub missing: Vec<(i64, i64)>,
}

/// Assembles tile spans of one layer and level
pub struct TileCompositor<'a> {
    source: &'a dyn TileSource,
    layer: String,
    level: u8,
    tile_px: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> TileCompositor<'a> {
    pub fn new(source: &'a dyn TileSource, layer: impl Into<String>, level: u8, tile_px: u32) -> Self {
        Self {
            source,
            layer: layer.into(),
            level,
            tile_px,
        }
    }

    /// Fetch every tile of `span` and paste it at its grid offset
    ///
    /// Tiles are fetched in parallel. A failed fetch, or a tile of the wrong size, leaves
    /// a [`BLANK_TILE`] square in place and is logged; the canvas keeps its full size.
    pub fn compose(&self, span: &TileSpan) -> Composite {
        let (width, height) = span.pixel_size(self.tile_px);
        let mut image = Raster::from_pixel(width, height, BLANK_TILE);

        let coords: Vec<(i64, i64)> = span.tiles().collect();
        let fetched: Vec<((i64, i64), Option<Raster>)> = coords
            .into_par_iter()
            .map(|(col, row)| ((col, row), self.fetch(col, row)))
            .collect();

        let mut missing = Vec::new();
        for ((col, row), tile) in fetched {
            match tile {
                Some(tile) => {
                    let x = (col - span.col_min) * i64::from(self.tile_px);
                    let y = (row - span.row_min) * i64::from(self.tile_px);
                    imageops::replace(&mut image, &tile, x, y);
                }
                None => missing.push((col, row)),
            }
        }

        if !missing.is_empty() {
            tracing::warn!(
                missing = missing.len(),
                total = span.len(),
                level = self.level,
                "Some tiles were replaced by blank placeholders"
            );
        }
        Composite { image, missing }
    }

    fn fetch(&self, col: i64, row: i64) -> Option<Raster> {
        let result = self
            .source
            .fetch_tile(col, row, &self.layer, self.level)
            .and_then(|tile| {
                if tile.dimensions() == (self.tile_px, self.tile_px) {
                    Ok(tile)
                } else {
                    Err(AtlasError::TileUnavailable {
                        col,
                        row,
                        level: self.level,
                        reason: format!(
                            "expected {px}x{px} pixels, got {}x{}",
                            tile.width(),
                            tile.height(),
                            px = self.tile_px
                        ),
                    })
                }
            });
        match result {
            Ok(tile) => Some(tile),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }
}
