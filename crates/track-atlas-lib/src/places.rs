//! Named places and the human-readable naming of segments

use crate::{ElevationProfile, GeoPoint};
use std::cmp::Ordering;
use std::fmt;

/// Settlement category, ordered by significance
///
/// Unknown kinds rank below every settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlaceKind {
    Hamlet,
    Village,
    Suburb,
    Town,
    City,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

impl PlaceKind {
    /// Significance rank, 0 for unknown kinds
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            PlaceKind::Other => 0,
            PlaceKind::Hamlet => 1,
            PlaceKind::Village => 2,
            PlaceKind::Suburb => 3,
            PlaceKind::Town => 4,
            PlaceKind::City => 5,
        }
    }

    /// Parse a settlement tag; unknown values map to [`PlaceKind::Other`]
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "hamlet" => PlaceKind::Hamlet,
            "village" => PlaceKind::Village,
            "suburb" => PlaceKind::Suburb,
            "town" => PlaceKind::Town,
            "city" => PlaceKind::City,
            _ => PlaceKind::Other,
        }
    }
}

impl Ord for PlaceKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for PlaceKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A named place near the track
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub population: Option<u64>,
    /// Administrative area code, e.g. a department number
    pub admin_code: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: PlaceKind,
    pub position: GeoPoint,
}

impl Place {
    /// Placeholder used when no place could be found
    pub fn unknown() -> Self {
        Self {
            name: "unknown".to_string(),
            population: None,
            admin_code: "00".to_string(),
            kind: PlaceKind::Other,
            position: GeoPoint::default(),
        }
    }

    fn significance_cmp(&self, other: &Place) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then(self.population.unwrap_or(0).cmp(&other.population.unwrap_or(0)))
            .then_with(|| self.admin_code.cmp(&other.admin_code))
            .then_with(|| self.name.cmp(&other.name))
    }

    fn proximity_cmp(&self, other: &Place, target: GeoPoint) -> Ordering {
        let a = GeoPoint::distance(self.position, target);
        let b = GeoPoint::distance(other.position, target);
        a.total_cmp(&b)
            .then_with(|| self.admin_code.cmp(&other.admin_code))
            .then_with(|| self.name.cmp(&other.name))
    }

    fn same_place(&self, other: &Place) -> bool {
        self.name == other.name && self.admin_code == other.admin_code
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.admin_code)
    }
}

/// Places used to name one segment
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentNames {
    /// Most significant place around the segment
    pub main: Place,
    /// Place closest to the first point
    pub from: Place,
    /// Place closest to the last point
    pub to: Place,
}

impl SegmentNames {
    /// Pick the main, start and end places among `places`
    ///
    /// Falls back to [`Place::unknown`] for all three when `places` is empty.
    pub fn resolve(places: &[Place], start: GeoPoint, end: GeoPoint) -> Self {
        let main = places.iter().max_by(|a, b| a.significance_cmp(b));
        let from = places.iter().min_by(|a, b| a.proximity_cmp(b, start));
        let to = places.iter().min_by(|a, b| a.proximity_cmp(b, end));
        match (main, from, to) {
            (Some(main), Some(from), Some(to)) => Self {
                main: main.clone(),
                from: from.clone(),
                to: to.clone(),
            },
            _ => Self {
                main: Place::unknown(),
                from: Place::unknown(),
                to: Place::unknown(),
            },
        }
    }

    /// Page title, numbered from 1
    pub fn title(&self, index: usize) -> String {
        format!("Stage {:02}: {}", index + 1, self.main.name)
    }

    /// Multi-line description of the route and its figures
    pub fn description(&self, profile: &ElevationProfile) -> String {
        let route = if self.from.same_place(&self.to) {
            format!("Through {}", self.from)
        } else {
            format!("From {} to {}", self.from, self.to)
        };
        [
            route,
            format!("Distance: {:.1} km", profile.total_km),
            format!("Altitude: {:.0}m - {:.0}m", profile.min_m, profile.max_m),
            format!(
                "Elevation: +{:.0}m ; -{:.0}m",
                profile.ascent_m, profile.descent_m
            ),
        ]
        .join("\n")
    }
}

/// Turn a title into something usable as a file name
pub fn encode_name(name: &str) -> String {
    name.replace(": ", "-")
        .replace(' ', "_")
        .replace(['\'', '/', '\\'], "-")
        .replace(':', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, code: &str, kind: PlaceKind, population: Option<u64>, lon: f64) -> Place {
        Place {
            name: name.to_string(),
            population,
            admin_code: code.to_string(),
            kind,
            position: GeoPoint::new(lon, 45.0),
        }
    }

    fn places() -> Vec<Place> {
        vec![
            place("Alpha", "12", PlaceKind::Village, Some(300), 0.0),
            place("Bravo", "12", PlaceKind::Town, Some(5_000), 0.5),
            place("Charlie", "34", PlaceKind::Town, Some(9_000), 1.0),
            place("Delta", "34", PlaceKind::Hamlet, None, 1.5),
        ]
    }

    #[test]
    fn test_kind_order() {
        assert!(PlaceKind::City > PlaceKind::Town);
        assert!(PlaceKind::Town > PlaceKind::Suburb);
        assert!(PlaceKind::Suburb > PlaceKind::Village);
        assert!(PlaceKind::Village > PlaceKind::Hamlet);
        assert!(PlaceKind::Hamlet > PlaceKind::Other);
        assert_eq!(PlaceKind::from_tag("City"), PlaceKind::City);
        assert_eq!(PlaceKind::from_tag("isolated_dwelling"), PlaceKind::Other);
    }

    #[test]
    fn test_unknown_kind_never_wins_main_place() {
        let list = vec![
            place("Bigfarm", "12", PlaceKind::Other, Some(90_000), 0.0),
            place("Echo", "12", PlaceKind::Hamlet, Some(40), 0.5),
        ];
        let names = SegmentNames::resolve(&list, GeoPoint::new(0.0, 45.0), GeoPoint::new(0.5, 45.0));
        assert_eq!(names.main.name, "Echo");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_kind_from_json() {
        let kinds: Vec<PlaceKind> =
            serde_json::from_str(r#"["city", "hamlet", "locality", "other"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![PlaceKind::City, PlaceKind::Hamlet, PlaceKind::Other, PlaceKind::Other]
        );
        assert_eq!(serde_json::to_string(&PlaceKind::Town).unwrap(), r#""town""#);
    }

    #[test]
    fn test_resolve() {
        let names = SegmentNames::resolve(
            &places(),
            GeoPoint::new(0.1, 45.0),
            GeoPoint::new(1.4, 45.0),
        );
        assert_eq!(names.main.name, "Charlie");
        assert_eq!(names.from.name, "Alpha");
        assert_eq!(names.to.name, "Delta");
    }

    #[test]
    fn test_resolve_distance_tie_breaks_on_code_then_name() {
        let list = vec![
            place("Zulu", "20", PlaceKind::Village, None, 1.0),
            place("Yankee", "10", PlaceKind::Village, None, 1.0),
            place("Xray", "10", PlaceKind::Village, None, 1.0),
        ];
        let target = GeoPoint::new(1.0, 45.0);
        let names = SegmentNames::resolve(&list, target, target);
        assert_eq!(names.from.name, "Xray");
    }

    #[test]
    fn test_resolve_empty_uses_sentinel() {
        let names = SegmentNames::resolve(&[], GeoPoint::default(), GeoPoint::default());
        assert_eq!(names.main, Place::unknown());
        assert_eq!(names.from.admin_code, "00");
        assert_eq!(names.title(0), "Stage 01: unknown");
    }

    #[test]
    fn test_description() {
        let profile = ElevationProfile::from_samples(
            vec![0, 10, 20],
            vec![0.0, 6.0, 12.34],
            vec![100.0, 180.0, 150.0],
        );
        let names = SegmentNames::resolve(
            &places(),
            GeoPoint::new(0.0, 45.0),
            GeoPoint::new(1.0, 45.0),
        );
        let text = names.description(&profile);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "From Alpha (12) to Charlie (34)");
        assert_eq!(lines[1], "Distance: 12.3 km");
        assert_eq!(lines[2], "Altitude: 100m - 180m");
        assert_eq!(lines[3], "Elevation: +80m ; -30m");

        let loop_names = SegmentNames::resolve(
            &places(),
            GeoPoint::new(0.5, 45.0),
            GeoPoint::new(0.5, 45.0),
        );
        assert!(loop_names.description(&profile).starts_with("Through Bravo (12)"));
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name("Stage 03: Saint-Jean d'Arc"), "Stage_03-Saint-Jean_d-Arc");
        assert_eq!(encode_name("a/b:c"), "a-b_c");
    }
}
