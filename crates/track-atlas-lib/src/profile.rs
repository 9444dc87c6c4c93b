//! Distance and elevation profile of a segment

use crate::{AtlasError, ElevationSource, GeoPoint, Result};

/// Path indices `start, start + stride, ...`, always ending on `end`
pub fn sample_indices(start: usize, end: usize, stride: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (start..=end).step_by(stride.max(1)).collect();
    if indices.last() != Some(&end) {
        indices.push(end);
    }
    indices
}

/// Cumulative distance in kilometers at each sampled index, starting at 0
///
/// Each leg is the geodesic distance between consecutive samples, multiplied by
/// `calibration` (1.0 leaves distances untouched).
pub fn cumulative_distances(path: &[GeoPoint], indices: &[usize], calibration: f64) -> Vec<f64> {
    let mut total = 0.0;
    let mut previous = indices.first().map(|&i| path[i]);
    indices
        .iter()
        .map(|&i| {
            if let Some(prev) = previous {
                total += calibration * GeoPoint::distance(prev, path[i]);
            }
            previous = Some(path[i]);
            total
        })
        .collect()
}

/// Sum of positive and of negative elevation changes, both returned as positive meters
pub fn ascent_descent(elevations: &[f64]) -> (f64, f64) {
    elevations
        .windows(2)
        .fold((0.0, 0.0), |(up, down), pair| {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                (up + delta, down)
            } else {
                (up, down - delta)
            }
        })
}

/// Sampled distance/elevation series of one segment plus its summary figures
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationProfile {
    /// Path index of each sample
    pub indices: Vec<usize>,
    /// Cumulative distance at each sample, in kilometers
    pub distances_km: Vec<f64>,
    /// Elevation at each sample, in meters
    pub elevations_m: Vec<f64>,
    pub total_km: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub min_m: f64,
    pub max_m: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ElevationProfile {
    /// Sample `path[start..=end]` every `stride` points and query their elevations
    pub fn build(
        path: &[GeoPoint],
        start: usize,
        end: usize,
        stride: usize,
        calibration: f64,
        elevations: &dyn ElevationSource,
    ) -> Result<Self> {
        let indices = sample_indices(start, end, stride);
        let lons: Vec<f64> = indices.iter().map(|&i| path[i].lon).collect();
        let lats: Vec<f64> = indices.iter().map(|&i| path[i].lat).collect();

        let heights = elevations.fetch_elevations(&lons, &lats)?;
        if heights.len() != indices.len() {
            return Err(AtlasError::ElevationMismatch {
                expected: indices.len(),
                actual: heights.len(),
            });
        }

        let distances = cumulative_distances(path, &indices, calibration);
        Ok(Self::from_samples(indices, distances, heights))
    }

    /// Assemble a profile from already aligned series
    pub fn from_samples(indices: Vec<usize>, distances_km: Vec<f64>, elevations_m: Vec<f64>) -> Self {
        let (ascent_m, descent_m) = ascent_descent(&elevations_m);
        let min_m = elevations_m.iter().copied().fold(f64::INFINITY, f64::min);
        let max_m = elevations_m.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            total_km: distances_km.last().copied().unwrap_or(0.0),
            indices,
            distances_km,
            elevations_m,
            ascent_m,
            descent_m,
            min_m: if min_m.is_finite() { min_m } else { 0.0 },
            max_m: if max_m.is_finite() { max_m } else { 0.0 },
        }
    }

    /// One-line summary printed under the legend chart
    pub fn statistics(&self) -> String {
        [
            format!("⇄ {:.1} km", self.total_km),
            format!("{:.0}m ⇵ {:.0}m", self.min_m, self.max_m),
            format!("↗ +{:.0}m", self.ascent_m),
            format!("↘ -{:.0}m", self.descent_m),
        ]
        .join("     ")
    }

    /// Tick marks every `step_km`, starting with 0 on the first sample
    ///
    /// Each tick is the path index of the first sample reaching a multiple of the
    /// step, paired with that multiple.
    pub fn ticks(&self, step_km: f64) -> Vec<(usize, f64)> {
        let mut ticks = Vec::new();
        if step_km <= 0.0 {
            return ticks;
        }
        if let Some(&first) = self.indices.first() {
            ticks.push((first, 0.0));
        }
        let mut next = step_km;
        for (&index, &distance) in self.indices.iter().zip(&self.distances_km) {
            if distance >= next {
                ticks.push((index, next));
                while next <= distance {
                    next += step_km;
                }
            }
        }
        ticks
    }
}
