//! Engine configuration
//!
//! Every heuristic threshold the engine uses lives here: snap radius, curve
//! and bump-out tolerances, validation limits and the history cap. Config can
//! be built programmatically, loaded from a JSON file, or adjusted through
//! environment variables.
//!
//! Environment variables:
//! - `PHOTO_MEASURE_SNAP_RADIUS_PX`: snap radius in pixels (default: 50)
//! - `PHOTO_MEASURE_PIXELS_PER_INCH`: fallback scale when never calibrated (default: unset)
//! - `PHOTO_MEASURE_MAX_HISTORY`: history cap (default: 100)

use crate::history::HistoryConfig;
use crate::snapping::SnapConfig;
use crate::validation::ValidationConfig;
use std::fs;
use std::path::Path;

pub const ENV_SNAP_RADIUS_PX: &str = "PHOTO_MEASURE_SNAP_RADIUS_PX";
pub const ENV_PIXELS_PER_INCH: &str = "PHOTO_MEASURE_PIXELS_PER_INCH";
pub const ENV_MAX_HISTORY: &str = "PHOTO_MEASURE_MAX_HISTORY";

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
}

/// Configuration for one measurement session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub snap: SnapConfig,
    /// Close the "tap 4 corners" flow automatically on the fourth tap
    pub auto_close_on_fourth_pin: bool,
    /// A traced path is a curve when it deviates from its chord by more than
    /// this fraction of the chord length
    pub curve_deviation_ratio: f64,
    /// Tolerance around 90 degrees for bump-out classification
    pub bump_out_tolerance_deg: f64,
    pub validation: ValidationConfig,
    pub history: HistoryConfig,
    /// Scale used when the session was never calibrated
    pub default_pixels_per_inch: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            auto_close_on_fourth_pin: true,
            curve_deviation_ratio: 0.10,
            bump_out_tolerance_deg: 10.0,
            validation: ValidationConfig::default(),
            history: HistoryConfig::default(),
            default_pixels_per_inch: None,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a JSON string; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Save configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_SNAP_RADIUS_PX) {
            self.snap.radius_px = parse_number(ENV_SNAP_RADIUS_PX, &val)?;
        }

        if let Some(val) = lookup(ENV_PIXELS_PER_INCH) {
            self.default_pixels_per_inch = Some(parse_number(ENV_PIXELS_PER_INCH, &val)?);
        }

        if let Some(val) = lookup(ENV_MAX_HISTORY) {
            self.history.max_history = val
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue(ENV_MAX_HISTORY.to_string()))?;
        }

        self.check()?;
        Ok(self)
    }

    /// Reject values the engine cannot work with
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.snap.radius_px >= 0.0) {
            return Err(ConfigError::InvalidValue("snap.radius_px".to_string()));
        }
        if !(self.curve_deviation_ratio > 0.0) {
            return Err(ConfigError::InvalidValue(
                "curve_deviation_ratio".to_string(),
            ));
        }
        if !(self.bump_out_tolerance_deg >= 0.0) {
            return Err(ConfigError::InvalidValue(
                "bump_out_tolerance_deg".to_string(),
            ));
        }
        if !(self.validation.max_aspect_ratio > 0.0) {
            return Err(ConfigError::InvalidValue(
                "validation.max_aspect_ratio".to_string(),
            ));
        }
        if self.history.max_history == 0 {
            return Err(ConfigError::InvalidValue("history.max_history".to_string()));
        }
        if let Some(ppi) = self.default_pixels_per_inch {
            if !(ppi > 0.0) || !ppi.is_finite() {
                return Err(ConfigError::InvalidValue(
                    "default_pixels_per_inch".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.snap.radius_px, 50.0);
        assert!(config.auto_close_on_fourth_pin);
        assert_eq!(config.curve_deviation_ratio, 0.10);
        assert_eq!(config.bump_out_tolerance_deg, 10.0);
        assert_eq!(config.validation.max_aspect_ratio, 5.0);
        assert_eq!(config.history.max_history, 100);
        assert!(config.default_pixels_per_inch.is_none());
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "snap": { "radius_px": 30.0 }, "validation": { "min_width_in": 4.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.snap.radius_px, 30.0);
        assert!(config.snap.enabled);
        assert_eq!(config.validation.min_width_in, 4.0);
        assert_eq!(config.validation.max_length_in, 120.0);
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "curve_deviation_ratio": 0.0 }"#),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measure.json");

        let config = EngineConfig {
            auto_close_on_fourth_pin: false,
            default_pixels_per_inch: Some(12.5),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EngineConfig::from_file("/nonexistent/measure.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_SNAP_RADIUS_PX, "25"),
            (ENV_PIXELS_PER_INCH, "8.5"),
            (ENV_MAX_HISTORY, "10"),
        ]);
        let config = EngineConfig::default()
            .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.snap.radius_px, 25.0);
        assert_eq!(config.default_pixels_per_inch, Some(8.5));
        assert_eq!(config.history.max_history, 10);
    }

    #[test]
    fn test_overrides_reject_garbage() {
        let result = EngineConfig::default().with_overrides_from(|key| {
            (key == ENV_PIXELS_PER_INCH).then(|| "abc".to_string())
        });
        assert!(
            matches!(result, Err(ConfigError::InvalidValue(key)) if key == ENV_PIXELS_PER_INCH)
        );

        let result = EngineConfig::default()
            .with_overrides_from(|key| (key == ENV_PIXELS_PER_INCH).then(|| "-2".to_string()));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(ENV_SNAP_RADIUS_PX, "40");
        let config = EngineConfig::from_env();
        std::env::remove_var(ENV_SNAP_RADIUS_PX);

        assert_eq!(config.unwrap().snap.radius_px, 40.0);
    }
}
