//! Legend corner selection
//!
//! The legend goes into whichever page corner covers the fewest points of the
//! drawn track line.

use geo::{Coord, Intersects, Rect};

/// Page corner, listed in tie-break order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Every corner in tie-break order
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Top-left pixel of an item of `item` size placed in this corner of `canvas`
    pub fn origin(self, canvas: (u32, u32), item: (u32, u32)) -> (u32, u32) {
        let right = canvas.0.saturating_sub(item.0);
        let bottom = canvas.1.saturating_sub(item.1);
        match self {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (right, 0),
            Corner::BottomRight => (right, bottom),
            Corner::BottomLeft => (0, bottom),
        }
    }

    /// Pixel rectangle an item of `item` size occupies in this corner
    pub fn rect(self, canvas: (u32, u32), item: (u32, u32)) -> Rect<f64> {
        let (x, y) = self.origin(canvas, item);
        Rect::new(
            Coord {
                x: f64::from(x),
                y: f64::from(y),
            },
            Coord {
                x: f64::from(x + item.0.min(canvas.0)),
                y: f64::from(y + item.1.min(canvas.1)),
            },
        )
    }
}

/// Picks a legend corner for legends of a fixed size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegendPlacer {
    legend_size: (u32, u32),
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LegendPlacer {
    pub fn new(legend_size: (u32, u32)) -> Self {
        Self { legend_size }
    }

    #[inline]
    pub fn legend_size(&self) -> (u32, u32) {
        self.legend_size
    }

    /// Number of `line` points inside each corner rectangle, bounds included
    pub fn counts(&self, canvas: (u32, u32), line: &[(f64, f64)]) -> [(Corner, usize); 4] {
        Corner::ALL.map(|corner| {
            let rect = corner.rect(canvas, self.legend_size);
            let hits = line
                .iter()
                .filter(|&&(x, y)| rect.intersects(&Coord { x, y }))
                .count();
            (corner, hits)
        })
    }

    /// Corner with the fewest line points; the earliest corner of [`Corner::ALL`] on ties
    pub fn place(&self, canvas: (u32, u32), line: &[(f64, f64)]) -> Corner {
        let counts = self.counts(canvas, line);
        let mut best = counts[0];
        for candidate in &counts[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        tracing::trace!(?counts, corner = ?best.0, "Legend placed");
        best.0
    }
}
