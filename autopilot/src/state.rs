use ahrs::ImuTruth;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Altitude every drone starts and resets at
pub const START_ALTITUDE: f64 = 3.0;

/// Rigid-body state of one drone, world frame, SI units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    pub position: na::Vector3<f64>,

    /// Euler angles (roll, pitch, yaw), each kept within ±π/4
    pub orientation: na::Vector3<f64>,

    pub velocity: na::Vector3<f64>,
    pub angular_velocity: na::Vector3<f64>,

    /// Last integrated acceleration, kept for the accelerometer model
    pub linear_acceleration: na::Vector3<f64>,
}

impl Default for DroneState {
    fn default() -> Self {
        Self::at(na::Vector3::new(0.0, 0.0, START_ALTITUDE))
    }
}

impl DroneState {
    /// At rest and level at `position`
    pub fn at(position: na::Vector3<f64>) -> Self {
        Self {
            position,
            orientation: na::Vector3::zeros(),
            velocity: na::Vector3::zeros(),
            angular_velocity: na::Vector3::zeros(),
            linear_acceleration: na::Vector3::zeros(),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn altitude(&self) -> f64 {
        self.position.z
    }

    pub fn imu_truth(&self) -> ImuTruth {
        ImuTruth {
            orientation: self.orientation,
            angular_velocity: self.angular_velocity,
            linear_acceleration: self.linear_acceleration,
            velocity: self.velocity,
        }
    }
}

/// Running totals for the current flight
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightStatistics {
    pub flight_time: f64,
    pub distance_traveled: f64,
    pub max_altitude: f64,
    pub max_speed: f64,
}

impl FlightStatistics {
    pub(crate) fn record(&mut self, dt: f64, displacement: f64, state: &DroneState) {
        self.flight_time += dt;
        self.distance_traveled += displacement;
        self.max_altitude = self.max_altitude.max(state.altitude());
        self.max_speed = self.max_speed.max(state.speed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_keep_maxima() {
        let mut stats = FlightStatistics::default();
        let mut state = DroneState::default();
        state.velocity = na::Vector3::new(3.0, 4.0, 0.0);
        stats.record(0.1, 0.5, &state);

        state.position.z = 1.0;
        state.velocity = na::Vector3::zeros();
        stats.record(0.1, 0.25, &state);

        assert!((stats.flight_time - 0.2).abs() < 1e-12);
        assert!((stats.distance_traveled - 0.75).abs() < 1e-12);
        assert_eq!(stats.max_altitude, START_ALTITUDE);
        assert_eq!(stats.max_speed, 5.0);
    }
}
