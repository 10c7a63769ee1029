use nalgebra as na;

use crate::config::AreaLimits;
use crate::state::DroneState;

/// Keeps a drone inside its flight volume
///
/// Each call runs three steps in order: a hard clamp of the position, a
/// velocity correction proportional to how deep the drone is inside the
/// repulsion margin, then damping of the velocity right at the walls.
/// Axes are handled independently.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryEnforcer {
    pub repulsion_margin: f64,
    pub repulsion_gain: f64,
    pub damping_margin: f64,
    pub damping_factor: f64,
}

impl Default for BoundaryEnforcer {
    fn default() -> Self {
        BoundaryEnforcer {
            repulsion_margin: 1.0,
            repulsion_gain: 3.0,
            damping_margin: 0.5,
            damping_factor: 0.7,
        }
    }
}

impl BoundaryEnforcer {
    pub fn enforce(&self, state: &mut DroneState, limits: &AreaLimits) {
        self.clamp(state, limits);
        self.repel(state, limits);
        self.damp(state, limits);
    }

    pub fn clamp(&self, state: &mut DroneState, limits: &AreaLimits) {
        let (min, max) = (limits.min(), limits.max());
        state.position = na::Vector3::from_fn(|i, _| state.position[i].clamp(min[i], max[i]));
    }

    pub fn repel(&self, state: &mut DroneState, limits: &AreaLimits) {
        let (min, max) = (limits.min(), limits.max());
        let margin = self.repulsion_margin;
        for i in 0..3 {
            let p = state.position[i];
            if p > max[i] - margin {
                state.velocity[i] += (max[i] - p - margin) * self.repulsion_gain;
            } else if p < min[i] + margin {
                state.velocity[i] += (min[i] + margin - p) * self.repulsion_gain;
            }
        }
    }

    pub fn damp(&self, state: &mut DroneState, limits: &AreaLimits) {
        let (min, max) = (limits.min(), limits.max());
        for i in 0..3 {
            let p = state.position[i];
            if p >= max[i] - self.damping_margin || p <= min[i] + self.damping_margin {
                state.velocity[i] *= self.damping_factor;
            }
        }
    }
}
