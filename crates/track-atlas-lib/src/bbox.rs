//! Longitude/latitude envelopes measured in kilometers
//!
//! A [`BoundingBox`] starts empty and grows as points are added. Its physical size is
//! measured the way a printed map sheet is: the width is the geodesic distance between
//! the midpoints of the west and east edges, the height the distance between the
//! midpoints of the north and south edges.

use crate::{EARTH_RADIUS_KM, GeoPoint};

/// Shortfalls below this are treated as already fitted (1 mm)
const FIT_TOLERANCE_KM: f64 = 1e-6;

/// Raw lon/lat bounds of a non-empty box
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Extent {
    #[inline]
    pub fn northwest(&self) -> GeoPoint {
        GeoPoint::new(self.lon_min, self.lat_max)
    }

    #[inline]
    pub fn northeast(&self) -> GeoPoint {
        GeoPoint::new(self.lon_max, self.lat_max)
    }

    #[inline]
    pub fn southwest(&self) -> GeoPoint {
        GeoPoint::new(self.lon_min, self.lat_min)
    }

    #[inline]
    pub fn southeast(&self) -> GeoPoint {
        GeoPoint::new(self.lon_max, self.lat_min)
    }

    /// Midpoint of the west edge
    #[inline]
    pub fn west(&self) -> GeoPoint {
        GeoPoint::midpoint(self.northwest(), self.southwest())
    }

    /// Midpoint of the east edge
    #[inline]
    pub fn east(&self) -> GeoPoint {
        GeoPoint::midpoint(self.northeast(), self.southeast())
    }

    /// Midpoint of the north edge
    #[inline]
    pub fn north(&self) -> GeoPoint {
        GeoPoint::midpoint(self.northwest(), self.northeast())
    }

    /// Midpoint of the south edge
    #[inline]
    pub fn south(&self) -> GeoPoint {
        GeoPoint::midpoint(self.southwest(), self.southeast())
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::midpoint(self.northwest(), self.southeast())
    }

    fn include(&mut self, point: GeoPoint) {
        self.lon_min = self.lon_min.min(point.lon);
        self.lon_max = self.lon_max.max(point.lon);
        self.lat_min = self.lat_min.min(point.lat);
        self.lat_max = self.lat_max.max(point.lat);
    }

    fn dims_km(&self) -> (f64, f64) {
        (
            GeoPoint::distance(self.west(), self.east()),
            GeoPoint::distance(self.north(), self.south()),
        )
    }
}

/// Growth-only lon/lat envelope with cached kilometer dimensions
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    extent: Option<Extent>,
    width_km: f64,
    height_km: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl BoundingBox {
    /// Create an empty box
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a box from explicit bounds (swapped bounds are reordered)
    pub fn from_bounds(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self::from_extent(Extent {
            lon_min: lon_min.min(lon_max),
            lon_max: lon_min.max(lon_max),
            lat_min: lat_min.min(lat_max),
            lat_max: lat_min.max(lat_max),
        })
    }

    /// Create the tight envelope of `points`
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Self {
        let mut bbox = Self::new();
        for point in points {
            bbox.add(point);
        }
        bbox
    }

    fn from_extent(extent: Extent) -> Self {
        let (width_km, height_km) = extent.dims_km();
        Self {
            extent: Some(extent),
            width_km,
            height_km,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    /// Raw bounds, `None` while the box is empty
    #[inline]
    pub fn extent(&self) -> Option<Extent> {
        self.extent
    }

    /// East-west size in kilometers (0 when empty)
    #[inline]
    pub fn width_km(&self) -> f64 {
        self.width_km
    }

    /// North-south size in kilometers (0 when empty)
    #[inline]
    pub fn height_km(&self) -> f64 {
        self.height_km
    }

    /// `(width_km, height_km)`
    #[inline]
    pub fn dims(&self) -> (f64, f64) {
        (self.width_km, self.height_km)
    }

    /// Widen the box so that it includes `point`
    pub fn add(&mut self, point: GeoPoint) {
        let extent = match self.extent {
            Some(mut extent) => {
                extent.include(point);
                extent
            }
            None => Extent {
                lon_min: point.lon,
                lon_max: point.lon,
                lat_min: point.lat,
                lat_max: point.lat,
            },
        };
        *self = Self::from_extent(extent);
    }

    /// Copy of this box with `point` included; `self` is left untouched
    pub fn union_with_point(&self, point: GeoPoint) -> BoundingBox {
        let mut bbox = self.clone();
        bbox.add(point);
        bbox
    }

    /// Strict fit test against a page size given in any orientation
    ///
    /// Both the larger and the smaller dimension must be strictly below their
    /// counterparts. This is a conjunction, not a lexicographic comparison.
    pub fn fits_within(&self, dim_a: f64, dim_b: f64) -> bool {
        let (self_max, self_min) = self.max_min_dims();
        let (max_dim, min_dim) = (dim_a.max(dim_b), dim_a.min(dim_b));
        self_max < max_dim && self_min < min_dim
    }

    /// Non-strict variant of [`BoundingBox::fits_within`]
    pub fn fits_within_or_equal(&self, dim_a: f64, dim_b: f64) -> bool {
        let (self_max, self_min) = self.max_min_dims();
        let (max_dim, min_dim) = (dim_a.max(dim_b), dim_a.min(dim_b));
        self_max <= max_dim && self_min <= min_dim
    }

    fn max_min_dims(&self) -> (f64, f64) {
        (
            self.width_km.max(self.height_km),
            self.width_km.min(self.height_km),
        )
    }

    /// Grow symmetrically by moving each edge midpoint outward
    ///
    /// `extra_lon_km` is added on both the west and east sides, `extra_lat_km` on both
    /// the north and south sides. An empty box stays empty.
    pub fn expand(&self, extra_lon_km: f64, extra_lat_km: f64) -> BoundingBox {
        let Some(extent) = self.extent else {
            return self.clone();
        };

        let west = extent.west().move_west(extra_lon_km);
        let east = extent.east().move_east(extra_lon_km);
        let north = extent.north().move_north(extra_lat_km);
        let south = extent.south().move_south(extra_lat_km);

        BoundingBox::from_bounds(west.lon, east.lon, south.lat, north.lat)
    }

    /// Grow to the aspect ratio of `target_width_km` × `target_height_km`
    ///
    /// The target is first oriented to match this box (landscape if wider than tall),
    /// then each axis grows by half its shortfall on each side. Axes that are already
    /// large enough are left alone, so the result always contains `self`.
    ///
    /// Edge positions are solved in closed form on the sphere rather than by stepping
    /// along great circles, so the fitted box is a fixed point of this method.
    pub fn expand_to(&self, target_width_km: f64, target_height_km: f64) -> BoundingBox {
        let Some(mut extent) = self.extent else {
            return self.clone();
        };
        let (w, h) = self.dims();
        let (large, small) = (
            target_width_km.max(target_height_km),
            target_width_km.min(target_height_km),
        );
        let (w_target, h_target) = if w > h { (large, small) } else { (small, large) };

        if (w_target - w) / 2.0 > FIT_TOLERANCE_KM {
            let mid_lat = ((extent.lat_min + extent.lat_max) / 2.0).to_radians();
            let half_chord = (w_target / (2.0 * EARTH_RADIUS_KM)).sin() / mid_lat.cos();
            let span = (2.0 * half_chord.min(1.0).asin()).to_degrees();
            let extra = (span - (extent.lon_max - extent.lon_min)) / 2.0;
            if extra > 0.0 {
                extent.lon_min -= extra;
                extent.lon_max += extra;
            }
        }
        if (h_target - h) / 2.0 > FIT_TOLERANCE_KM {
            let span = (h_target / EARTH_RADIUS_KM).to_degrees();
            let extra = (span - (extent.lat_max - extent.lat_min)) / 2.0;
            if extra > 0.0 {
                extent.lat_min -= extra;
                extent.lat_max += extra;
            }
        }
        BoundingBox::from_extent(extent)
    }

    /// Inclusive containment test; an empty box contains nothing
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self.extent {
            Some(e) => {
                e.lon_min <= point.lon
                    && point.lon <= e.lon_max
                    && e.lat_min <= point.lat
                    && point.lat <= e.lat_max
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NW: GeoPoint = GeoPoint::new(2.82383, 47.9042);
    const SE: GeoPoint = GeoPoint::new(3.12595, 47.82128);
    const SW: GeoPoint = GeoPoint::new(2.82414, 47.82183);
    const NE: GeoPoint = GeoPoint::new(3.12489, 47.90613);

    #[test]
    fn test_empty_box() {
        let bbox = BoundingBox::new();
        assert!(bbox.is_empty());
        assert_eq!(bbox.dims(), (0.0, 0.0));
        assert!(!bbox.contains(NW));
        assert!(bbox.expand(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_first_add_sets_all_bounds() {
        let mut bbox = BoundingBox::new();
        bbox.add(NW);
        let extent = bbox.extent().unwrap();
        assert_eq!(extent.lon_min, NW.lon);
        assert_eq!(extent.lon_max, NW.lon);
        assert_eq!(extent.lat_min, NW.lat);
        assert_eq!(extent.lat_max, NW.lat);
        assert_eq!(bbox.dims(), (0.0, 0.0));
    }

    #[test]
    fn test_add_is_monotonic() {
        let points = [NW, GeoPoint::new(2.89761, 47.8227), SE, SW, NE];
        let mut bbox = BoundingBox::new();
        let mut seen = Vec::new();
        for point in points {
            let (w, h) = bbox.dims();
            bbox.add(point);
            seen.push(point);
            assert!(bbox.width_km() >= w);
            assert!(bbox.height_km() >= h);
            for prior in &seen {
                assert!(bbox.contains(*prior));
            }
        }
        let extent = bbox.extent().unwrap();
        assert!(extent.lon_min <= extent.lon_max);
        assert!(extent.lat_min <= extent.lat_max);
    }

    #[test]
    fn test_dims_use_edge_midpoints() {
        let bbox = BoundingBox::from_points([NW, SE]);
        let extent = bbox.extent().unwrap();
        let width = GeoPoint::distance(extent.west(), extent.east());
        let height = GeoPoint::distance(extent.north(), extent.south());
        assert!((bbox.width_km() - width).abs() < 1e-12);
        assert!((bbox.height_km() - height).abs() < 1e-12);
        // Roughly 22.6 km wide and 9.2 km tall
        assert!(bbox.width_km() > 20.0 && bbox.width_km() < 25.0);
        assert!(bbox.height_km() > 8.0 && bbox.height_km() < 10.0);
    }

    #[test]
    fn test_union_with_point_does_not_mutate() {
        let bbox = BoundingBox::from_points([NW]);
        let union = bbox.union_with_point(SE);
        assert_eq!(bbox.dims(), (0.0, 0.0));
        assert!(union.contains(SE));
        assert!(union.contains(NW));
        assert!(!bbox.contains(SE));
    }

    #[test]
    fn test_fits_within_is_conjunctive() {
        // 10 km x 2 km box
        let origin = GeoPoint::new(0.0, 0.0);
        let bbox = BoundingBox::from_points([origin, origin.move_east(10.0).move_north(2.0)]);
        let (w, h) = bbox.dims();
        assert!((w - 10.0).abs() < 0.01);
        assert!((h - 2.0).abs() < 0.01);

        assert!(bbox.fits_within(11.0, 3.0));
        assert!(bbox.fits_within(3.0, 11.0));
        // Larger dimension too big even though the smaller one fits
        assert!(!bbox.fits_within(9.0, 3.0));
        // Lexicographically smaller, but the smaller dimension does not fit
        assert!(!bbox.fits_within(11.0, 1.0));
        // Strict vs non-strict at equality
        assert!(!bbox.fits_within(w, h));
        assert!(bbox.fits_within_or_equal(w, h));
    }

    #[test]
    fn test_expand_grows_each_side() {
        let bbox = BoundingBox::from_points([NW, SE]);
        let expanded = bbox.expand(1.0, 2.0);
        assert!((expanded.width_km() - (bbox.width_km() + 2.0)).abs() < 1e-3);
        assert!((expanded.height_km() - (bbox.height_km() + 4.0)).abs() < 1e-3);
        assert!(expanded.contains(NW));
        assert!(expanded.contains(SE));
    }

    #[test]
    fn test_expand_to_matches_aspect_ratio() {
        let bbox = BoundingBox::from_points([NW, SE]);
        // Box is wider than tall, so the target is used in landscape orientation
        let fitted = bbox.expand_to(21.0 * 1.5, 29.7 * 1.5);
        let (w, h) = fitted.dims();
        assert!((w - 29.7 * 1.5).abs() < 1e-3, "width {w}");
        assert!((h - 21.0 * 1.5).abs() < 1e-3, "height {h}");
        assert!((w / h - 29.7 / 21.0).abs() < 1e-4);
        assert!(fitted.contains(NW));
        assert!(fitted.contains(SE));
    }

    #[test]
    fn test_expand_to_only_grows() {
        let bbox = BoundingBox::from_points([NW, SE]);
        // Target smaller than the box in both axes: nothing to do
        let fitted = bbox.expand_to(1.0, 2.0);
        assert_eq!(fitted, bbox);
    }

    #[test]
    fn test_expand_to_is_idempotent() {
        let bbox = BoundingBox::from_points([NW, GeoPoint::new(2.89761, 47.8227)]);
        let once = bbox.expand_to(12.0, 17.0);
        let twice = once.expand_to(12.0, 17.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_expand_to_degenerate_box() {
        let bbox = BoundingBox::from_points([NW, NW, NW]);
        let fitted = bbox.expand_to(2.0, 3.0);
        let (w, h) = fitted.dims();
        assert!(w.is_finite() && h.is_finite());
        // Zero-size boxes are treated as portrait
        assert!((w - 2.0).abs() < 1e-3);
        assert!((h - 3.0).abs() < 1e-3);
        assert!(fitted.contains(NW));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::from_points([NW, SE]);
        let extent = bbox.extent().unwrap();
        assert!(bbox.contains(extent.northwest()));
        assert!(bbox.contains(extent.southeast()));
        assert!(bbox.contains(extent.center()));
        assert!(!bbox.contains(GeoPoint::new(extent.lon_max + 1e-9, extent.lat_max)));
    }

    #[test]
    fn test_from_bounds_reorders() {
        let bbox = BoundingBox::from_bounds(3.0, 2.0, 48.0, 47.0);
        let extent = bbox.extent().unwrap();
        assert_eq!((extent.lon_min, extent.lon_max), (2.0, 3.0));
        assert_eq!((extent.lat_min, extent.lat_max), (47.0, 48.0));
    }
}
