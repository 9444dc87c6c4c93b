//! Geodetic points on a spherical Earth
//!
//! Distances use the haversine formula and movement uses the direct spherical
//! geodesic formula, both on the same mean Earth radius so that the two operations
//! stay consistent with each other.

use std::ops::{Add, Div, Mul, Sub};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A longitude/latitude pair in degrees
///
/// Component-wise arithmetic is provided for midpoints and interpolation over small
/// areas only. Degrees are not locally linear, so moving a point by a distance must go
/// through [`GeoPoint::offset`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl GeoPoint {
    #[inline]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance between two points in kilometers
    #[inline]
    pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
        let lat1 = a.lat.to_radians();
        let lat2 = b.lat.to_radians();
        let delta_lat = (b.lat - a.lat).to_radians();
        let delta_lon = (b.lon - a.lon).to_radians();

        let h = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Distance from `self` to `other` in kilometers
    #[inline]
    pub fn distance_to(&self, other: GeoPoint) -> f64 {
        Self::distance(*self, other)
    }

    /// Move along the great circle starting at `bearing_deg` (0 = north, clockwise)
    ///
    /// Out-of-range results are returned as computed: no wrapping at ±180° and no
    /// clamping at the poles.
    pub fn offset(&self, distance_km: f64, bearing_deg: f64) -> GeoPoint {
        let delta = distance_km / EARTH_RADIUS_KM;
        let theta = bearing_deg.to_radians();

        let lon1 = self.lon.to_radians();
        let lat1 = self.lat.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lon2.to_degrees(), lat2.to_degrees())
    }

    #[inline]
    pub fn move_north(&self, distance_km: f64) -> GeoPoint {
        self.offset(distance_km, 0.0)
    }

    #[inline]
    pub fn move_east(&self, distance_km: f64) -> GeoPoint {
        self.offset(distance_km, 90.0)
    }

    #[inline]
    pub fn move_south(&self, distance_km: f64) -> GeoPoint {
        self.offset(distance_km, 180.0)
    }

    #[inline]
    pub fn move_west(&self, distance_km: f64) -> GeoPoint {
        self.offset(distance_km, 270.0)
    }

    /// Component-wise midpoint (small-area approximation)
    #[inline]
    pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
        (a + b) / 2.0
    }
}

impl Add for GeoPoint {
    type Output = GeoPoint;

    fn add(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.lon + rhs.lon, self.lat + rhs.lat)
    }
}

impl Sub for GeoPoint {
    type Output = GeoPoint;

    fn sub(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.lon - rhs.lon, self.lat - rhs.lat)
    }
}

impl Mul<f64> for GeoPoint {
    type Output = GeoPoint;

    fn mul(self, rhs: f64) -> GeoPoint {
        GeoPoint::new(self.lon * rhs, self.lat * rhs)
    }
}

impl Mul<GeoPoint> for f64 {
    type Output = GeoPoint;

    fn mul(self, rhs: GeoPoint) -> GeoPoint {
        rhs * self
    }
}

impl Div<f64> for GeoPoint {
    type Output = GeoPoint;

    fn div(self, rhs: f64) -> GeoPoint {
        GeoPoint::new(self.lon / rhs, self.lat / rhs)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        GeoPoint::new(point.x(), point.y())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}
