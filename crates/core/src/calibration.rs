//! Calibration and physical units
//!
//! Converts pixel lengths into real-world units. A calibration is derived from
//! a reference of known size (or set manually) and stays global to one photo
//! session. Display units are a pure multiplicative transform on top.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::EPSILON;
use std::fmt;
use std::str::FromStr;

/// Physical length unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum Unit {
    #[default]
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "yd")]
    Yards,
    #[serde(rename = "m")]
    Meters,
}

impl Unit {
    /// All supported units, in the order a unit picker cycles through them
    pub const ALL: [Unit; 6] = [
        Unit::Inches,
        Unit::Centimeters,
        Unit::Millimeters,
        Unit::Feet,
        Unit::Yards,
        Unit::Meters,
    ];

    /// How many of this unit make up one inch
    pub fn per_inch(self) -> f64 {
        match self {
            Unit::Inches => 1.0,
            Unit::Centimeters => 2.54,
            Unit::Millimeters => 25.4,
            Unit::Feet => 1.0 / 12.0,
            Unit::Yards => 1.0 / 36.0,
            Unit::Meters => 0.0254,
        }
    }

    /// Short symbol used in labels and serialized data
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Inches => "in",
            Unit::Centimeters => "cm",
            Unit::Millimeters => "mm",
            Unit::Feet => "ft",
            Unit::Yards => "yd",
            Unit::Meters => "m",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => Ok(Unit::Inches),
            "cm" | "centimeter" | "centimeters" => Ok(Unit::Centimeters),
            "mm" | "millimeter" | "millimeters" => Ok(Unit::Millimeters),
            "ft" | "foot" | "feet" | "'" => Ok(Unit::Feet),
            "yd" | "yard" | "yards" => Ok(Unit::Yards),
            "m" | "meter" | "meters" => Ok(Unit::Meters),
            other => Err(MeasureError::UnknownUnit(other.to_string())),
        }
    }
}

/// Convert a length between units
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    value / from.per_inch() * to.per_inch()
}

/// Convert an area between units (squared factor)
pub fn convert_area(value: f64, from: Unit, to: Unit) -> f64 {
    let factor = to.per_inch() / from.per_inch();
    value * factor * factor
}

/// Derive a pixels-per-unit scale from a reference length
///
/// Fails if the declared length is not strictly positive or the reference is
/// degenerate (both endpoints coincide).
pub fn calibrate(reference_pixel_length: f64, known_length: f64) -> MeasureResult<f64> {
    if !known_length.is_finite() || known_length <= 0.0 {
        return Err(MeasureError::InvalidCalibration(format!(
            "known length must be positive, got {known_length}"
        )));
    }
    if !reference_pixel_length.is_finite() || reference_pixel_length < EPSILON {
        return Err(MeasureError::InvalidCalibration(
            "reference line has no length".to_string(),
        ));
    }
    Ok(reference_pixel_length / known_length)
}

/// Convert a pixel length to physical units with a pixels-per-unit scale
pub fn to_physical(pixel_length: f64, pixels_per_unit: f64) -> MeasureResult<f64> {
    if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
        return Err(MeasureError::Uncalibrated);
    }
    Ok(pixel_length / pixels_per_unit)
}

/// Where a calibration came from
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CalibrationSource {
    /// Scale typed in directly
    Manual,
    /// Reference line of known length
    Reference {
        /// Pixel length of the reference when the calibration was taken
        pixel_length: f64,
        /// Declared real-world length, in the calibration unit
        known_length: f64,
    },
    /// Configured fallback scale, used when the user never calibrated
    Default,
}

/// Pixels-per-unit scale for one photo session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Calibration {
    /// Pixels per one `unit`; always > 0
    pixels_per_unit: f64,
    /// Unit the scale is expressed in
    unit: Unit,
    source: CalibrationSource,
}

impl Calibration {
    /// Create a manual calibration
    pub fn manual(pixels_per_unit: f64, unit: Unit) -> MeasureResult<Self> {
        if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
            return Err(MeasureError::InvalidCalibration(format!(
                "pixels per unit must be positive, got {pixels_per_unit}"
            )));
        }
        Ok(Self {
            pixels_per_unit,
            unit,
            source: CalibrationSource::Manual,
        })
    }

    /// Calibrate from a reference of `pixel_length` pixels that is `known_length` long
    pub fn from_reference(pixel_length: f64, known_length: f64, unit: Unit) -> MeasureResult<Self> {
        let pixels_per_unit = calibrate(pixel_length, known_length)?;
        Ok(Self {
            pixels_per_unit,
            unit,
            source: CalibrationSource::Reference {
                pixel_length,
                known_length,
            },
        })
    }

    /// Fallback scale in pixels per inch
    pub(crate) fn fallback(pixels_per_inch: f64) -> MeasureResult<Self> {
        let mut calibration = Self::manual(pixels_per_inch, Unit::Inches)?;
        calibration.source = CalibrationSource::Default;
        Ok(calibration)
    }

    /// Pixels per one calibration unit
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    /// Unit the calibration was taken in
    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn source(&self) -> &CalibrationSource {
        &self.source
    }

    /// Scale normalized to pixels per inch
    pub fn pixels_per_inch(&self) -> f64 {
        self.pixels_per_unit * self.unit.per_inch()
    }

    /// Convert a pixel length to `unit`
    pub fn length_in(&self, pixel_length: f64, unit: Unit) -> f64 {
        convert(pixel_length / self.pixels_per_unit, self.unit, unit)
    }

    /// Convert a pixel area (px^2) to square `unit`
    pub fn area_in(&self, pixel_area: f64, unit: Unit) -> f64 {
        convert_area(
            pixel_area / (self.pixels_per_unit * self.pixels_per_unit),
            self.unit,
            unit,
        )
    }

    /// Convert a physical length in `unit` back to pixels
    pub fn to_pixels(&self, length: f64, unit: Unit) -> f64 {
        convert(length, unit, self.unit) * self.pixels_per_unit
    }
}
