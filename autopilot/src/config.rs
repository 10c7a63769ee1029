use ahrs::SensorConfig;
use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::{AutopilotError, AutopilotResult};

/// Axis-aligned flight volume in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaLimits {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Default for AreaLimits {
    fn default() -> Self {
        Self {
            x_min: -8.0,
            x_max: 8.0,
            y_min: -8.0,
            y_max: 8.0,
            z_min: 0.5,
            z_max: 15.0,
        }
    }
}

impl AreaLimits {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> AutopilotResult<Self> {
        let limits = Self {
            x_min: x.0,
            x_max: x.1,
            y_min: y.0,
            y_max: y.1,
            z_min: z.0,
            z_max: z.1,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn min(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x_min, self.y_min, self.z_min)
    }

    pub fn max(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x_max, self.y_max, self.z_max)
    }

    pub fn contains(&self, position: &na::Vector3<f64>) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|i| position[i] >= min[i] && position[i] <= max[i])
    }

    pub fn validate(&self) -> AutopilotResult<()> {
        let (min, max) = (self.min(), self.max());
        for (i, axis) in ['x', 'y', 'z'].into_iter().enumerate() {
            if !(min[i].is_finite() && max[i].is_finite() && min[i] < max[i]) {
                return Err(AutopilotError::InvalidAreaLimits {
                    axis,
                    min: min[i],
                    max: max[i],
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropellerConfig {
    /// Upper bound for a single propeller's thrust
    pub max_thrust: f64,
    pub efficiency: [f64; 4],
}

impl Default for PropellerConfig {
    fn default() -> Self {
        Self {
            max_thrust: 6.0,
            efficiency: [0.95, 0.97, 0.96, 0.94],
        }
    }
}

/// Discrete gust model: each tick a gust appears with `gust_probability`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub gust_probability: f64,
    /// Half-width of the x and y gust range
    pub horizontal: f64,
    /// Half-width of the z gust range
    pub vertical: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            gust_probability: 0.2,
            horizontal: 0.3,
            vertical: 0.1,
        }
    }
}

impl WindConfig {
    pub fn calm() -> Self {
        Self {
            gust_probability: 0.0,
            ..Self::default()
        }
    }
}

/// Waypoint generation for the autonomous mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Distance under which the current target counts as reached
    pub arrival_radius: f64,
    pub target_x: (f64, f64),
    pub target_y: (f64, f64),
    pub target_z: (f64, f64),
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 1.0,
            target_x: (-6.0, 6.0),
            target_y: (-6.0, 6.0),
            target_z: (2.0, 10.0),
        }
    }
}

/// Full-deflection command produced by each RC stick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickRates {
    pub thrust: f64,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl Default for StickRates {
    fn default() -> Self {
        Self {
            thrust: 1.0,
            pitch: 0.5,
            roll: 0.5,
            yaw: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub area_limits: AreaLimits,
    pub propellers: PropellerConfig,
    pub sensors: SensorConfig,
    pub wind: WindConfig,
    pub guidance: GuidanceConfig,
    pub rc: StickRates,
    /// Minimum simulated time between two telemetry snapshots, seconds
    pub telemetry_interval: f64,
    /// Seed for every random source of the drone; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            area_limits: AreaLimits::default(),
            propellers: PropellerConfig::default(),
            sensors: SensorConfig::default(),
            wind: WindConfig::default(),
            guidance: GuidanceConfig::default(),
            rc: StickRates::default(),
            telemetry_interval: 0.2,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> AutopilotResult<()> {
        self.area_limits.validate()?;

        let p = &self.propellers;
        if !(p.max_thrust.is_finite() && p.max_thrust > 0.1) {
            return Err(AutopilotError::invalid(
                "propellers.max_thrust",
                format!("{} must exceed the 0.1 minimum thrust", p.max_thrust),
            ));
        }
        if p.efficiency.iter().any(|e| !(e.is_finite() && *e > 0.0)) {
            return Err(AutopilotError::invalid(
                "propellers.efficiency",
                "every efficiency must be positive",
            ));
        }

        let w = &self.wind;
        if !(0.0..=1.0).contains(&w.gust_probability) {
            return Err(AutopilotError::invalid(
                "wind.gust_probability",
                format!("{} is not a probability", w.gust_probability),
            ));
        }
        if !(w.horizontal.is_finite() && w.horizontal >= 0.0)
            || !(w.vertical.is_finite() && w.vertical >= 0.0)
        {
            return Err(AutopilotError::invalid(
                "wind",
                "gust half-widths must be finite and non-negative",
            ));
        }

        let g = &self.guidance;
        if !(g.arrival_radius.is_finite() && g.arrival_radius > 0.0) {
            return Err(AutopilotError::invalid(
                "guidance.arrival_radius",
                "must be positive",
            ));
        }
        for (name, (lo, hi)) in [
            ("guidance.target_x", g.target_x),
            ("guidance.target_y", g.target_y),
            ("guidance.target_z", g.target_z),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(AutopilotError::invalid(
                    name,
                    format!("range {}..{} is empty", lo, hi),
                ));
            }
        }

        if !(self.telemetry_interval.is_finite() && self.telemetry_interval >= 0.0) {
            return Err(AutopilotError::invalid(
                "telemetry_interval",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
