//! Sanity checks over measured shapes
//!
//! The thresholds are tuned for stone-remnant and countertop photography and
//! are plain configuration, not geometry. Validation never fails: problems come
//! back as warnings next to otherwise valid metrics.

/// Validation thresholds
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum pins before a shape is checked at all
    pub min_pins: usize,
    /// Minimum lines before a shape is checked at all
    pub min_lines: usize,
    /// Warn when length / width is strictly above this
    pub max_aspect_ratio: f64,
    /// Warn when width is below this, in inches
    pub min_width_in: f64,
    /// Warn when length is above this, in inches
    pub max_length_in: f64,
    /// Tolerance around 90 degrees for right-angle detection
    pub right_angle_tolerance_deg: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_pins: 4,
            min_lines: 2,
            max_aspect_ratio: 5.0,
            min_width_in: 6.0,
            // Remnants are assumed to be under ~10 ft
            max_length_in: 120.0,
            right_angle_tolerance_deg: 10.0,
        }
    }
}

pub const INSUFFICIENT_DATA: &str = "Insufficient data: place at least 4 pins and 2 lines";
pub const UNUSUAL_ASPECT_RATIO: &str = "Unusual aspect ratio";
pub const VERY_SMALL_WIDTH: &str = "Very small width";
pub const UNUSUALLY_LARGE_DIMENSION: &str = "Unusually large dimension";

/// Outcome of validating the current shape
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub has_right_angles: bool,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.is_valid = self.warnings.is_empty();
        self
    }
}

/// What validation looks at, already reduced from the pin graph
#[derive(Debug, Clone, Default)]
pub struct ValidationInput {
    pub pin_count: usize,
    pub line_count: usize,
    /// Longest edge and the longest edge distinct from it, in pixels
    pub dimensions_px: Option<(f64, f64)>,
    /// Pixels per inch, when a scale is available
    pub pixels_per_inch: Option<f64>,
    /// Corner angles between consecutive lines, degrees in `[0, 180]`
    pub corner_angles: Vec<f64>,
    /// Whether the shape is a closed four-sided one
    pub is_rectangle: bool,
}

/// Checks measured shapes against plausibility thresholds
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a shape
    pub fn validate(&self, input: &ValidationInput) -> ValidationReport {
        let mut report = ValidationReport {
            has_right_angles: has_right_angles(
                &input.corner_angles,
                self.config.right_angle_tolerance_deg,
            ),
            ..Default::default()
        };

        if input.pin_count < self.config.min_pins || input.line_count < self.config.min_lines {
            report.warnings.push(INSUFFICIENT_DATA.to_string());
            return report.finish();
        }

        let Some((length_px, width_px)) = input.dimensions_px else {
            report.warnings.push(INSUFFICIENT_DATA.to_string());
            return report.finish();
        };

        if width_px > 0.0 && length_px / width_px > self.config.max_aspect_ratio {
            report.warnings.push(format!(
                "{UNUSUAL_ASPECT_RATIO} ({:.1}:1)",
                length_px / width_px
            ));
            report
                .suggestions
                .push("Check that the pins sit on the actual corners of the piece".to_string());
        }

        match input.pixels_per_inch {
            Some(ppi) if ppi > 0.0 => {
                let (length_in, width_in) = (length_px / ppi, width_px / ppi);
                self.check_sizes(length_in, width_in, &mut report);
            }
            _ => report
                .suggestions
                .push("Calibrate against a reference to enable size checks".to_string()),
        }

        if input.is_rectangle && !report.has_right_angles {
            report.suggestions.push(
                "Corners are far from square; consider the polygon tool for irregular shapes"
                    .to_string(),
            );
        }

        report.finish()
    }

    fn check_sizes(&self, length_in: f64, width_in: f64, report: &mut ValidationReport) {
        if width_in < self.config.min_width_in {
            report
                .warnings
                .push(format!("{VERY_SMALL_WIDTH} ({width_in:.1} in)"));
            report
                .suggestions
                .push("Verify the calibration reference length".to_string());
        }
        if length_in > self.config.max_length_in {
            report
                .warnings
                .push(format!("{UNUSUALLY_LARGE_DIMENSION} ({length_in:.1} in)"));
            report
                .suggestions
                .push("Verify the calibration; remnants are rarely over 10 ft".to_string());
        }
    }
}

/// Whether at least 2 corner angles are within `tolerance_deg` of 90
///
/// Corner angles are unsigned and never exceed 180, so a reflex 270 degree
/// corner arrives here as 90 and needs no separate check.
pub fn has_right_angles(corner_angles: &[f64], tolerance_deg: f64) -> bool {
    corner_angles
        .iter()
        .filter(|angle| (*angle - 90.0).abs() <= tolerance_deg)
        .count()
        >= 2
}
