use log::{debug, info};
use nalgebra as na;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GuidanceConfig;
use crate::control::{ControlInput, THRUST_RANGE, TRIM_THRUST};

/// Distance under which the direction to the target is treated as zero
const DIRECTION_EPSILON: f64 = 0.1;

/// Attitude command per unit of horizontal direction
const TILT_GAIN: f64 = 0.8;

/// Thrust added per meter of altitude error
const CLIMB_GAIN: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlMode {
    Manual,
    Auto,
    /// Seeking a target supplied from outside every tick
    Follow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Manual,
    Auto { target: na::Vector3<f64> },
    Follow { target: na::Vector3<f64> },
}

/// Picks the command for each tick: the pilot's in manual mode, a
/// waypoint-seeking one in auto mode
#[derive(Debug, Clone)]
pub struct GuidanceController {
    config: GuidanceConfig,
    mode: Mode,
    waypoints_reached: u32,
}

impl GuidanceController {
    pub fn new(config: &GuidanceConfig) -> Self {
        GuidanceController {
            config: config.clone(),
            mode: Mode::Manual,
            waypoints_reached: 0,
        }
    }

    pub fn mode(&self) -> ControlMode {
        match self.mode {
            Mode::Manual => ControlMode::Manual,
            Mode::Auto { .. } => ControlMode::Auto,
            Mode::Follow { .. } => ControlMode::Follow,
        }
    }

    /// Current target, only while seeking one
    pub fn target(&self) -> Option<na::Vector3<f64>> {
        match self.mode {
            Mode::Manual => None,
            Mode::Auto { target } | Mode::Follow { target } => Some(target),
        }
    }

    pub fn waypoints_reached(&self) -> u32 {
        self.waypoints_reached
    }

    pub fn toggle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ControlMode {
        self.mode = match self.mode {
            Mode::Manual => {
                let target = self.random_target(rng);
                info!(
                    "Switched to AUTO, heading for ({:.2}, {:.2}, {:.2})",
                    target.x, target.y, target.z
                );
                Mode::Auto { target }
            }
            Mode::Auto { .. } | Mode::Follow { .. } => {
                info!("Switched to MANUAL");
                Mode::Manual
            }
        };
        self.mode()
    }

    /// Seek an externally supplied target, replacing any previous one
    pub fn follow(&mut self, target: na::Vector3<f64>) {
        if !matches!(self.mode, Mode::Follow { .. }) {
            info!(
                "Switched to FOLLOW, heading for ({:.2}, {:.2}, {:.2})",
                target.x, target.y, target.z
            );
        }
        self.mode = Mode::Follow { target };
    }

    pub fn reset(&mut self) {
        self.mode = Mode::Manual;
        self.waypoints_reached = 0;
    }

    /// Command for this tick
    pub fn command<R: Rng + ?Sized>(
        &mut self,
        manual: &ControlInput,
        position: &na::Vector3<f64>,
        rng: &mut R,
    ) -> ControlInput {
        match self.mode {
            Mode::Manual => *manual,
            Mode::Auto { target } => {
                let target = self.advance_target(target, position, rng);
                Self::seek(&target, position)
            }
            Mode::Follow { target } => Self::seek(&target, position),
        }
    }

    fn advance_target<R: Rng + ?Sized>(
        &mut self,
        target: na::Vector3<f64>,
        position: &na::Vector3<f64>,
        rng: &mut R,
    ) -> na::Vector3<f64> {
        if (target - position).norm() >= self.config.arrival_radius {
            return target;
        }

        self.waypoints_reached += 1;
        let next = self.random_target(rng);
        debug!(
            "Waypoint {} reached, next target ({:.2}, {:.2}, {:.2})",
            self.waypoints_reached, next.x, next.y, next.z
        );
        self.mode = Mode::Auto { target: next };
        next
    }

    fn seek(target: &na::Vector3<f64>, position: &na::Vector3<f64>) -> ControlInput {
        let to_target = target - position;
        let distance = to_target.norm();
        let direction = if distance > DIRECTION_EPSILON {
            to_target / distance
        } else {
            na::Vector3::zeros()
        };

        let thrust = (TRIM_THRUST + to_target.z * CLIMB_GAIN).clamp(THRUST_RANGE.0, THRUST_RANGE.1);
        ControlInput::new(thrust, -direction.x * TILT_GAIN, direction.y * TILT_GAIN, 0.0)
    }

    fn random_target<R: Rng + ?Sized>(&self, rng: &mut R) -> na::Vector3<f64> {
        let c = &self.config;
        na::Vector3::new(
            rng.gen_range(c.target_x.0..c.target_x.1),
            rng.gen_range(c.target_y.0..c.target_y.1),
            rng.gen_range(c.target_z.0..c.target_z.1),
        )
    }
}
