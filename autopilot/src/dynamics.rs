use core::f64::consts::FRAC_PI_4;

use ahrs::utils::GRAVITY;
use nalgebra as na;
use rand::Rng;

use crate::config::WindConfig;
use crate::state::{DroneState, FlightStatistics};

/// Largest tilt on any axis, radians
pub const MAX_ANGLE: f64 = FRAC_PI_4;

/// Linear drag coefficient for the unit-mass airframe
const DRAG_COEFFICIENT: f64 = 0.2;

/// Unit thrust direction in the world frame for the given roll and pitch
pub fn thrust_direction(roll: f64, pitch: f64) -> na::Vector3<f64> {
    na::Vector3::new(
        pitch.sin() * roll.cos(),
        -roll.sin() * pitch.cos(),
        roll.cos() * pitch.cos(),
    )
}

/// Explicit Euler integrator for a point mass of 1 kg
#[derive(Debug, Default, Clone, Copy)]
pub struct RigidBodyIntegrator;

impl RigidBodyIntegrator {
    /// Advance `state` by one tick; boundary handling is left to the caller
    pub fn step(
        &self,
        state: &mut DroneState,
        stats: &mut FlightStatistics,
        thrust: f64,
        wind: &na::Vector3<f64>,
        dt: f64,
    ) {
        let previous_position = state.position;

        state.orientation += state.angular_velocity * dt;
        state.orientation = state.orientation.map(|a| a.clamp(-MAX_ANGLE, MAX_ANGLE));

        let thrust_force = thrust_direction(state.orientation.x, state.orientation.y) * thrust;
        let gravity = na::Vector3::new(0.0, 0.0, -GRAVITY);
        let drag = -state.velocity * DRAG_COEFFICIENT;
        let acceleration = thrust_force + gravity + drag + wind;

        state.linear_acceleration = acceleration;
        state.velocity += acceleration * dt;
        state.position += state.velocity * dt;

        stats.record(dt, (state.position - previous_position).norm(), state);
    }
}

/// Discrete per-tick gusts
#[derive(Debug, Clone)]
pub struct WindModel {
    config: WindConfig,
    current: na::Vector3<f64>,
}

impl WindModel {
    pub fn new(config: &WindConfig) -> Self {
        WindModel {
            config: config.clone(),
            current: na::Vector3::zeros(),
        }
    }

    pub fn current(&self) -> na::Vector3<f64> {
        self.current
    }

    /// Draw the wind for the coming tick: a gust or dead calm
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> na::Vector3<f64> {
        let gust = self.config.gust_probability > 0.0
            && rng.gen::<f64>() < self.config.gust_probability;
        self.current = if gust {
            let h = self.config.horizontal;
            let v = self.config.vertical;
            na::Vector3::new(uniform(rng, h), uniform(rng, h), uniform(rng, v))
        } else {
            na::Vector3::zeros()
        };
        self.current
    }

    pub fn reset(&mut self) {
        self.current = na::Vector3::zeros();
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}
