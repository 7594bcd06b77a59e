//! Pin snapping for taps and drags
//!
//! Resolves a position to an existing nearby pin. Snapping is caller-side
//! policy: `connect` never snaps on its own, the host (or
//! `MeasurementEngine::tap`) asks here first.

use crate::geometry::Point;
use crate::model::{Pin, PinId};

/// Configuration for snapping behavior
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Enable/disable snapping onto existing pins
    pub enabled: bool,
    /// Snap radius in pixels; a candidate must be strictly closer than this
    pub radius_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_px: 50.0,
        }
    }
}

/// Finds the pin a position should snap onto
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    /// Create a snap engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snap engine with custom configuration
    pub fn with_config(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Nearest pin strictly within the snap radius, skipping `exclude`
    ///
    /// Ties on distance go to the earlier pin.
    pub fn nearest_pin(
        &self,
        position: Point,
        pins: &[Pin],
        exclude: Option<PinId>,
    ) -> Option<PinId> {
        if !self.config.enabled {
            return None;
        }

        pins.iter()
            .filter(|pin| Some(pin.id) != exclude)
            .map(|pin| (pin.id, position.distance_to(&pin.position())))
            .filter(|(_, distance)| *distance < self.config.radius_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}
