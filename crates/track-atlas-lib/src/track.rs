//! Track input: GPX parsing into an ordered point sequence

use crate::projection::MAX_LATITUDE;
use crate::{AtlasError, GeoPoint, Result};
use std::io::{BufReader, Read};

/// Ordered path read from a track file
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// Track name, empty if the file has none
    pub name: String,
    pub points: Vec<GeoPoint>,
    /// Elevation recorded with each point, in meters, aligned with `points`
    pub elevations: Vec<Option<f64>>,
}

impl Track {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every point carries an elevation
    pub fn has_elevations(&self) -> bool {
        !self.elevations.is_empty() && self.elevations.iter().all(Option::is_some)
    }

    /// Geodesic length in kilometers
    pub fn distance_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| GeoPoint::distance(pair[0], pair[1]))
            .sum()
    }
}

/// Read a GPX document into a [`Track`]
///
/// All track segments of all tracks are concatenated in file order. Files without
/// tracks fall back to their routes. Points outside the Web-Mercator latitude range
/// are skipped.
///
/// # Errors
/// Returns [`AtlasError::GpxParse`] for malformed input and [`AtlasError::EmptyTrack`]
/// when no usable point remains.
pub fn read_track<R: Read>(reader: R) -> Result<Track> {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::read_track");

    let gpx = gpx::read(BufReader::new(reader))?;

    let name = gpx
        .tracks
        .iter()
        .find_map(|track| track.name.clone())
        .or_else(|| gpx.metadata.as_ref().and_then(|meta| meta.name.clone()))
        .unwrap_or_default();

    let waypoints: Vec<&gpx::Waypoint> = if gpx.tracks.iter().any(|t| !t.segments.is_empty()) {
        gpx.tracks
            .iter()
            .flat_map(|track| &track.segments)
            .flat_map(|segment| &segment.points)
            .collect()
    } else {
        gpx.routes.iter().flat_map(|route| &route.points).collect()
    };

    let mut track = Track {
        name,
        points: Vec::with_capacity(waypoints.len()),
        elevations: Vec::with_capacity(waypoints.len()),
    };
    for waypoint in waypoints {
        let point = GeoPoint::from(waypoint.point());
        if !point.lat.is_finite() || !point.lon.is_finite() || point.lat.abs() > MAX_LATITUDE {
            tracing::warn!(
                "Skipping point outside Web Mercator bounds: ({}, {})",
                point.lat,
                point.lon
            );
            continue;
        }
        track.points.push(point);
        track.elevations.push(waypoint.elevation);
    }

    if track.is_empty() {
        return Err(AtlasError::EmptyTrack);
    }
    tracing::debug!(name = %track.name, points = track.len(), "Track loaded");
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Loire crossing</name>
    <trkseg>
      <trkpt lat="47.9042" lon="2.82383"><ele>120.5</ele></trkpt>
      <trkpt lat="47.9000" lon="2.8300"><ele>118.0</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="47.8950" lon="2.8400"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_read_track() {
        let track = read_track(GPX.as_bytes()).unwrap();
        assert_eq!(track.name, "Loire crossing");
        assert_eq!(track.len(), 3);
        assert_eq!(track.points[0], GeoPoint::new(2.82383, 47.9042));
        assert_eq!(track.elevations, vec![Some(120.5), Some(118.0), None]);
        assert!(!track.has_elevations());
        assert!(track.distance_km() > 0.5);
    }

    #[test]
    fn test_read_route_fallback() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <rte>
    <rtept lat="45.0" lon="1.0"><ele>10</ele></rtept>
    <rtept lat="45.1" lon="1.1"><ele>20</ele></rtept>
  </rte>
</gpx>"#;
        let track = read_track(gpx.as_bytes()).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.name, "");
        assert!(track.has_elevations());
    }

    #[test]
    fn test_empty_track() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1"></gpx>"#;
        assert!(matches!(read_track(gpx.as_bytes()), Err(AtlasError::EmptyTrack)));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            read_track("not xml".as_bytes()),
            Err(AtlasError::GpxParse(_))
        ));
    }
}
