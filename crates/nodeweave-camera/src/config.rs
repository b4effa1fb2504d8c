//! Navigation & viewport parameters.

use nodeweave_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::{CameraError, Result};

/// Camera navigation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    /// Viewport width / height.
    pub aspect: f64,
    /// Viewport height in pixels, used to make panning perspective-correct.
    pub viewport_height: f64,
    /// Closest allowed camera-to-look-at distance.
    pub min_zoom: f64,
    /// Farthest allowed camera-to-look-at distance.
    pub max_zoom: f64,
    /// Per-frame exponential smoothing factor toward the targets.
    pub smoothing: f64,
    /// Base of the exponential wheel zoom.
    pub zoom_base: f64,
    /// Wheel delta multiplier in the zoom exponent.
    pub zoom_exponent: f64,
    /// Orbit rotation per dragged pixel, in radians.
    pub orbit_speed: f64,
    /// Capacity of the view history stack.
    pub max_history: usize,
    /// How many bounding radii should fit in the half field of view when focusing.
    pub focus_size_factor: f64,
    /// Extra distance added when focusing on an entity.
    pub focus_padding: f64,
    /// Transition length used by callers that do not pick one, in seconds.
    pub default_transition_secs: f64,
    /// Position used by `reset_view` before any initial state is captured.
    pub default_position: Vec3,
    /// Look-at point paired with `default_position`.
    pub default_look_at: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            viewport_height: 900.0,
            min_zoom: 20.0,
            max_zoom: 5000.0,
            smoothing: 0.12,
            zoom_base: 0.95,
            zoom_exponent: 12.0,
            orbit_speed: 0.005,
            max_history: 20,
            focus_size_factor: 2.0,
            focus_padding: 40.0,
            default_transition_secs: 0.6,
            default_position: Vec3::new(0.0, 0.0, 700.0),
            default_look_at: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CameraConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Half of the vertical field of view, in radians.
    pub fn half_fov(&self) -> f64 {
        self.fov_degrees.to_radians() / 2.0
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", "must be in (0, 180)"));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(invalid("aspect", "must be > 0"));
        }
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(invalid("viewport_height", "must be > 0"));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(invalid("min_zoom", "must satisfy 0 < min_zoom <= max_zoom"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(invalid("smoothing", "must be in (0, 1]"));
        }
        if !(self.zoom_base > 0.0 && self.zoom_base < 1.0) {
            return Err(invalid("zoom_base", "must be in (0, 1)"));
        }
        if self.max_history == 0 {
            return Err(invalid("max_history", "must be >= 1"));
        }
        if self.default_position.distance(self.default_look_at) <= 0.0 {
            return Err(invalid("default_position", "must differ from default_look_at"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> CameraError {
    CameraError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = CameraConfig::from_json_str(r#"{"min_zoom": 5.0, "default_position": [0.0, 100.0, 400.0]}"#)
            .unwrap();
        assert_eq!(config.min_zoom, 5.0);
        assert_eq!(config.default_position, Vec3::new(0.0, 100.0, 400.0));
        assert_eq!(config.max_history, 20);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let err = CameraConfig::from_json_str(r#"{"min_zoom": 900.0, "max_zoom": 100.0}"#).unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig { field: "min_zoom", .. }));
    }
}
