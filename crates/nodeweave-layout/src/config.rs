//! Tunable parameters for the simulator and its scheduler.

use std::time::Duration;

use nodeweave_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::{LayoutError, Result};

/// Force and integration parameters of [`ForceSimulator`](crate::ForceSimulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pairwise repulsion constant (force = repulsion / distance²).
    pub repulsion: f64,
    /// Multiplier applied to the summed bounding radii before testing overlap.
    pub collision_padding: f64,
    /// Strength of the short-range separation term for overlapping pairs.
    pub collision_strength: f64,
    /// Pull toward `gravity_center`; 0 disables it.
    pub center_strength: f64,
    /// Point the center force pulls toward.
    pub gravity_center: Vec3,
    /// Scale applied to the Z component of every force (< 1 flattens the layout).
    pub z_spread_factor: f64,
    /// Per-step velocity attenuation (0-1, lower = more friction).
    pub damping: f64,
    /// Velocity magnitude clamp.
    pub max_speed: f64,
    /// Squared distance below which a pair is treated as coincident.
    pub degenerate_epsilon_sq: f64,
    /// Seed for kicks and coincident-pair directions; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion: 5000.0,
            collision_padding: 1.2,
            collision_strength: 0.05,
            center_strength: 0.0005,
            gravity_center: Vec3::ZERO,
            z_spread_factor: 0.3,
            damping: 0.85,
            max_speed: 50.0,
            degenerate_epsilon_sq: 1e-4,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check ranges that would make the integration unstable.
    pub fn validate(&self) -> Result<()> {
        non_negative("repulsion", self.repulsion)?;
        non_negative("collision_strength", self.collision_strength)?;
        non_negative("center_strength", self.center_strength)?;
        if !(self.collision_padding.is_finite() && self.collision_padding >= 1.0) {
            return Err(LayoutError::invalid("collision_padding", "must be >= 1"));
        }
        if !(self.z_spread_factor > 0.0 && self.z_spread_factor <= 1.0) {
            return Err(LayoutError::invalid("z_spread_factor", "must be in (0, 1]"));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(LayoutError::invalid("damping", "must be in (0, 1)"));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(LayoutError::invalid("max_speed", "must be > 0"));
        }
        if !(self.degenerate_epsilon_sq.is_finite() && self.degenerate_epsilon_sq > 0.0) {
            return Err(LayoutError::invalid("degenerate_epsilon_sq", "must be > 0"));
        }
        if !self.gravity_center.is_finite() {
            return Err(LayoutError::invalid("gravity_center", "must be finite"));
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid(field, format!("must be a finite value >= 0, got {value}")))
    }
}

/// Wake/idle policy of [`SimulationScheduler`](crate::SimulationScheduler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Energy below which the loop may go idle.
    pub min_energy_threshold: f64,
    /// Minimum time since the last kick before an idle stop, in milliseconds.
    pub auto_stop_delay_ms: u64,
    /// Intensity used by topology-triggered kicks and `reheat`.
    pub default_kick_intensity: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_energy_threshold: 0.1,
            auto_stop_delay_ms: 4000,
            default_kick_intensity: 1.0,
        }
    }
}

impl SchedulerConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SchedulerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-stop delay as a duration.
    pub fn auto_stop_delay(&self) -> Duration {
        Duration::from_millis(self.auto_stop_delay_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        non_negative("min_energy_threshold", self.min_energy_threshold)?;
        non_negative("default_kick_intensity", self.default_kick_intensity)?;
        Ok(())
    }
}
