//! File-backed collaborators: a tile directory, a place list and the track's own elevations

use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use track_atlas_lib::{
    AtlasError, BoundingBox, ElevationSource, GeoPoint, Place, PlaceSource, Raster, Result,
    TileSource, Track,
};

/// Tiles stored as `{root}/{layer}/{level}/{col}/{row}.{ext}`
#[derive(Clone, Debug)]
pub struct DirTileSource {
    root: PathBuf,
    extension: String,
}

impl DirTileSource {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn tile_path(&self, col: i64, row: i64, layer: &str, level: u8) -> PathBuf {
        self.root
            .join(layer)
            .join(level.to_string())
            .join(col.to_string())
            .join(format!("{row}.{}", self.extension))
    }
}

impl TileSource for DirTileSource {
    fn fetch_tile(&self, col: i64, row: i64, layer: &str, level: u8) -> Result<Raster> {
        let path = self.tile_path(col, row, layer, level);
        let unavailable = |reason: String| AtlasError::TileUnavailable {
            col,
            row,
            level,
            reason,
        };
        if !path.is_file() {
            return Err(unavailable(format!("no file at {}", path.display())));
        }
        image::open(&path)
            .map(|tile| tile.to_rgb8())
            .map_err(|err| unavailable(format!("{}: {err}", path.display())))
    }
}

/// Places read once from a JSON array
#[derive(Clone, Debug, Default)]
pub struct PlaceFile {
    places: Vec<Place>,
}

impl PlaceFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read places file {}", path.display()))?;
        let places: Vec<Place> = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse places file {}", path.display()))?;
        tracing::info!(places = places.len(), "Places loaded");
        Ok(Self { places })
    }
}

impl PlaceSource for PlaceFile {
    fn fetch_places(&self, bbox: &BoundingBox) -> Result<Vec<Place>> {
        Ok(self
            .places
            .iter()
            .filter(|place| bbox.contains(place.position))
            .cloned()
            .collect())
    }
}

/// Answers elevation queries from the elevations recorded in the track
///
/// Gaps in the recording are filled from the closest recorded neighbour. A track
/// without any elevation reads as flat ground at 0 m.
#[derive(Clone, Debug)]
pub struct TrackElevations {
    points: Vec<GeoPoint>,
    elevations: Vec<f64>,
    by_position: HashMap<(u64, u64), usize>,
}

impl TrackElevations {
    pub fn from_track(track: &Track) -> Self {
        let elevations = fill_gaps(&track.elevations);
        let by_position = track
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| (key(*point), i))
            .collect();
        Self {
            points: track.points.clone(),
            elevations,
            by_position,
        }
    }

    fn lookup(&self, point: GeoPoint) -> f64 {
        let index = self.by_position.get(&key(point)).copied().or_else(|| {
            (0..self.points.len()).min_by(|&a, &b| {
                GeoPoint::distance(self.points[a], point)
                    .total_cmp(&GeoPoint::distance(self.points[b], point))
            })
        });
        index.map_or(0.0, |i| self.elevations[i])
    }
}

fn key(point: GeoPoint) -> (u64, u64) {
    (point.lon.to_bits(), point.lat.to_bits())
}

/// Replace every missing value by the nearest recorded one, preferring the earlier on ties
fn fill_gaps(recorded: &[Option<f64>]) -> Vec<f64> {
    if recorded.iter().all(Option::is_none) {
        if !recorded.is_empty() {
            tracing::warn!("Track has no elevation data, profiles will be flat");
        }
        return vec![0.0; recorded.len()];
    }

    let mut previous: Vec<Option<(usize, f64)>> = Vec::with_capacity(recorded.len());
    let mut last = None;
    for (i, value) in recorded.iter().enumerate() {
        if let Some(value) = value {
            last = Some((i, *value));
        }
        previous.push(last);
    }

    let mut filled = vec![0.0; recorded.len()];
    let mut next = None;
    for i in (0..recorded.len()).rev() {
        if let Some(value) = recorded[i] {
            next = Some((i, value));
        }
        filled[i] = match (previous[i], next) {
            (Some((p, before)), Some((n, after))) => {
                if i - p <= n - i {
                    before
                } else {
                    after
                }
            }
            (Some((_, value)), None) | (None, Some((_, value))) => value,
            (None, None) => 0.0,
        };
    }
    filled
}

impl ElevationSource for TrackElevations {
    fn fetch_elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>> {
        if lons.len() != lats.len() {
            return Err(AtlasError::ElevationUnavailable(format!(
                "{} longitudes for {} latitudes",
                lons.len(),
                lats.len()
            )));
        }
        Ok(lons
            .iter()
            .zip(lats)
            .map(|(&lon, &lat)| self.lookup(GeoPoint::new(lon, lat)))
            .collect())
    }
}
