//! Paper formats and metric length units

use crate::{AtlasError, Result};
use std::fmt;
use std::str::FromStr;

const CM_PER_INCH: f64 = 2.54;

/// Metric length units, from millimeters to kilometers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Decimeter,
    Meter,
    Decameter,
    Hectometer,
    Kilometer,
}

impl LengthUnit {
    /// Size of one unit in meters
    pub fn meters(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1e-3,
            LengthUnit::Centimeter => 1e-2,
            LengthUnit::Decimeter => 1e-1,
            LengthUnit::Meter => 1.0,
            LengthUnit::Decameter => 1e1,
            LengthUnit::Hectometer => 1e2,
            LengthUnit::Kilometer => 1e3,
        }
    }

    /// Convert `value` expressed in `from` into `to`
    #[inline]
    pub fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
        value * (from.meters() / to.meters())
    }
}

impl FromStr for LengthUnit {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mm" => Ok(LengthUnit::Millimeter),
            "cm" => Ok(LengthUnit::Centimeter),
            "dm" => Ok(LengthUnit::Decimeter),
            "m" => Ok(LengthUnit::Meter),
            "dam" => Ok(LengthUnit::Decameter),
            "hm" => Ok(LengthUnit::Hectometer),
            "km" => Ok(LengthUnit::Kilometer),
            other => Err(AtlasError::InvalidFormat(format!("unknown unit '{other}'"))),
        }
    }
}

/// A physical paper size, optionally bound to a print resolution
///
/// Dimensions are stored in inches (portrait: width ≤ height for the presets).
/// Binding a DPI produces a new value; formats are otherwise immutable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageFormat {
    name: String,
    width_in: f64,
    height_in: f64,
    dpi: Option<f64>,
}

impl PageFormat {
    /// Create a format from centimeters
    pub fn from_cm(name: impl Into<String>, width_cm: f64, height_cm: f64) -> Self {
        Self::from_inches(name, width_cm / CM_PER_INCH, height_cm / CM_PER_INCH)
    }

    /// Create a format from inches
    pub fn from_inches(name: impl Into<String>, width_in: f64, height_in: f64) -> Self {
        Self {
            name: name.into(),
            width_in,
            height_in,
            dpi: None,
        }
    }

    pub fn a0() -> Self {
        Self::from_cm("A0", 84.1, 118.9)
    }

    pub fn a1() -> Self {
        Self::from_cm("A1", 59.4, 84.1)
    }

    pub fn a2() -> Self {
        Self::from_cm("A2", 42.0, 59.4)
    }

    pub fn a3() -> Self {
        Self::from_cm("A3", 29.7, 42.0)
    }

    pub fn a4() -> Self {
        Self::from_cm("A4", 21.0, 29.7)
    }

    pub fn letter() -> Self {
        Self::from_inches("letter", 8.5, 11.0)
    }

    pub fn legal() -> Self {
        Self::from_inches("legal", 8.5, 14.0)
    }

    /// Same paper bound to `dpi`
    pub fn with_dpi(&self, dpi: f64) -> Self {
        Self {
            dpi: Some(dpi),
            ..self.clone()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    /// `(width, height)` in inches
    #[inline]
    pub fn inches(&self) -> (f64, f64) {
        (self.width_in, self.height_in)
    }

    /// `(width, height)` in centimeters
    #[inline]
    pub fn cm(&self) -> (f64, f64) {
        (self.width_in * CM_PER_INCH, self.height_in * CM_PER_INCH)
    }

    /// Height over width
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.height_in / self.width_in
    }

    /// Pixel size at the bound DPI, `None` if no DPI is bound
    pub fn px(&self) -> Option<(u32, u32)> {
        self.dpi.map(|dpi| self.to_px(dpi))
    }

    /// Pixel size at an arbitrary DPI
    pub fn to_px(&self, dpi: f64) -> (u32, u32) {
        (
            (dpi * self.width_in).floor() as u32,
            (dpi * self.height_in).floor() as u32,
        )
    }

    /// Pixel size at the bound DPI, or an error naming the format
    pub fn require_px(&self) -> Result<(u32, u32)> {
        self.px()
            .ok_or_else(|| AtlasError::MissingDpi(self.name.clone()))
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dpi {
            Some(dpi) => write!(f, "{} @ {dpi} dpi", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for PageFormat {
    type Err = AtlasError;

    /// Parse a preset name (`A4`, `letter`, ...) or a custom size such as `21x29.7cm`,
    /// `210x297mm` or `8.5x11in`
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "a0" => return Ok(Self::a0()),
            "a1" => return Ok(Self::a1()),
            "a2" => return Ok(Self::a2()),
            "a3" => return Ok(Self::a3()),
            "a4" => return Ok(Self::a4()),
            "letter" => return Ok(Self::letter()),
            "legal" => return Ok(Self::legal()),
            _ => {}
        }

        let invalid = || AtlasError::InvalidFormat(s.to_string());
        let split = lower
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (dims, unit) = lower.split_at(split);
        let (w, h) = dims.split_once('x').ok_or_else(invalid)?;
        let w: f64 = w.trim().parse().map_err(|_| invalid())?;
        let h: f64 = h.trim().parse().map_err(|_| invalid())?;
        if w <= 0.0 || h <= 0.0 {
            return Err(invalid());
        }

        let name = s.trim().to_string();
        if unit == "in" {
            return Ok(Self::from_inches(name, w, h));
        }
        let unit: LengthUnit = unit.parse()?;
        Ok(Self::from_cm(
            name,
            LengthUnit::convert(w, unit, LengthUnit::Centimeter),
            LengthUnit::convert(h, unit, LengthUnit::Centimeter),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert!((LengthUnit::convert(21.0, LengthUnit::Centimeter, LengthUnit::Kilometer) - 21e-5).abs() < 1e-15);
        assert!((LengthUnit::convert(1.0, LengthUnit::Kilometer, LengthUnit::Millimeter) - 1e6).abs() < 1e-6);
        assert_eq!(LengthUnit::convert(5.0, LengthUnit::Meter, LengthUnit::Meter), 5.0);
    }

    #[test]
    fn test_a4_pixels() {
        let a4 = PageFormat::a4();
        assert!(a4.px().is_none());
        assert!(a4.require_px().is_err());

        let a4 = a4.with_dpi(150.0);
        assert_eq!(a4.px(), Some((1240, 1753)));
        assert_eq!(a4.name(), "A4");
        assert_eq!(a4.dpi(), Some(150.0));
    }

    #[test]
    fn test_with_dpi_leaves_original_untouched() {
        let letter = PageFormat::letter();
        let bound = letter.with_dpi(72.0);
        assert!(letter.dpi().is_none());
        assert_eq!(bound.px(), Some((612, 792)));
    }

    #[test]
    fn test_cm_roundtrip_and_aspect() {
        let a3 = PageFormat::a3();
        let (w, h) = a3.cm();
        assert!((w - 29.7).abs() < 1e-9);
        assert!((h - 42.0).abs() < 1e-9);
        assert!((a3.aspect_ratio() - 42.0 / 29.7).abs() < 1e-12);
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!("A4".parse::<PageFormat>().unwrap(), PageFormat::a4());
        assert_eq!("a2".parse::<PageFormat>().unwrap(), PageFormat::a2());
        assert_eq!("Legal".parse::<PageFormat>().unwrap(), PageFormat::legal());
    }

    #[test]
    fn test_parse_custom_sizes() {
        let f: PageFormat = "21x29.7cm".parse().unwrap();
        let (w, h) = f.cm();
        assert!((w - 21.0).abs() < 1e-9 && (h - 29.7).abs() < 1e-9);

        let f: PageFormat = "210x297mm".parse().unwrap();
        let (w, h) = f.cm();
        assert!((w - 21.0).abs() < 1e-9 && (h - 29.7).abs() < 1e-9);

        let f: PageFormat = "8.5x11in".parse().unwrap();
        assert_eq!(f.inches(), (8.5, 11.0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("B5".parse::<PageFormat>().is_err());
        assert!("21cm".parse::<PageFormat>().is_err());
        assert!("0x10cm".parse::<PageFormat>().is_err());
        assert!("21x29.7parsecs".parse::<PageFormat>().is_err());
    }
}
