//! Track line and distance ticks in page pixel space

use crate::{ElevationProfile, GeoPoint, PixelFrame};

/// Visible part of a path, in pixels of one page
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackLine {
    /// Path index of `points[0]`
    pub first_idx: usize,
    /// Consecutive projected points, all inside the page
    pub points: Vec<(f64, f64)>,
    /// Tick positions with the distance they mark, in kilometers
    pub ticks: Vec<((f64, f64), f64)>,
}

impl TrackLine {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pixel position of path index `idx`, if visible
    pub fn pixel_at(&self, idx: usize) -> Option<(f64, f64)> {
        idx.checked_sub(self.first_idx)
            .and_then(|offset| self.points.get(offset))
            .copied()
    }

    /// Path index range covered by the line (inclusive)
    pub fn index_range(&self) -> Option<(usize, usize)> {
        (!self.points.is_empty()).then(|| (self.first_idx, self.first_idx + self.points.len() - 1))
    }
}

/// Projects a path onto one page
#[derive(Clone, Copy, Debug)]
pub struct TrackOverlay {
    frame: PixelFrame,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackOverlay {
    pub fn new(frame: PixelFrame) -> Self {
        Self { frame }
    }

    #[inline]
    pub fn frame(&self) -> &PixelFrame {
        &self.frame
    }

    /// First index of `path[start..=end]` that lands on the page
    pub fn first_visible(&self, path: &[GeoPoint], start: usize, end: usize) -> Option<usize> {
        let end = end.min(path.len().checked_sub(1)?);
        (start..=end).find(|&i| self.frame.contains(self.frame.to_pixel(path[i])))
    }

    /// Contiguous visible run of `path` around `anchor`
    ///
    /// Walks backward from the anchor while points stay on the page, then forward,
    /// and returns that run. The line is empty when the anchor itself is off the page.
    pub fn visible_line(&self, path: &[GeoPoint], anchor: usize) -> TrackLine {
        let project = |i: usize| {
            let pixel = self.frame.to_pixel(path[i]);
            self.frame.contains(pixel).then_some(pixel)
        };

        let Some(anchor_pixel) = (anchor < path.len()).then(|| project(anchor)).flatten() else {
            return TrackLine {
                first_idx: anchor,
                ..TrackLine::default()
            };
        };

        let mut before = Vec::new();
        let mut first = anchor;
        while first > 0 {
            match project(first - 1) {
                Some(pixel) => {
                    before.push(pixel);
                    first -= 1;
                }
                None => break,
            }
        }
        before.reverse();

        let mut points = before;
        points.push(anchor_pixel);
        points.extend((anchor + 1..path.len()).map_while(project));

        TrackLine {
            first_idx: first,
            points,
            ticks: Vec::new(),
        }
    }

    /// Visible line plus a tick every `step_km` of `profile`
    ///
    /// Tick positions are taken from the line by path index; ticks falling off the
    /// page are dropped.
    pub fn project(
        &self,
        path: &[GeoPoint],
        anchor: usize,
        profile: &ElevationProfile,
        step_km: f64,
    ) -> TrackLine {
        let mut line = self.visible_line(path, anchor);
        line.ticks = profile
            .ticks(step_km)
            .into_iter()
            .filter_map(|(idx, km)| line.pixel_at(idx).map(|pixel| (pixel, km)))
            .collect();
        line
    }
}
