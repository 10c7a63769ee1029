//! # AHRS - Attitude and Heading Reference System
//!
//! Synthetic inertial sensing for the simulated quadrotor. The crate turns the
//! true motion of the airframe into the readings a real MEMS IMU would produce
//! and offers the simple attitude estimate a flight controller can derive from
//! them.
//!
//! ## Features
//!
//! - Gyroscope and accelerometer models with bias, scale factor and white noise
//! - Calibration that redraws the residual biases
//! - Roll/pitch estimation from the accelerometer with a confidence heuristic
//! - Seedable random source for reproducible runs
//!
//! ## Platform Support
//!
//! - **desktop**: For desktop applications and SITL (Software In The Loop) simulation

use nalgebra as na;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod imu;
pub mod sensors;
pub mod utils;

pub use error::{AhrsError, AhrsResult, SensorType};
pub use imu::{estimate_orientation, SensorModel};
pub use sensors::{
    AccelerometerReading, GyroscopeReading, ImuSample, ImuTruth, OrientationEstimate,
};

/// Sensor imperfection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Gyroscope white noise standard deviation in rad/s
    pub gyro_noise: f64,

    /// Accelerometer white noise standard deviation in m/s^2
    pub accel_noise: f64,

    /// Initial gyroscope bias in rad/s
    pub gyro_bias: na::Vector3<f64>,

    /// Initial accelerometer bias in m/s^2
    pub accel_bias: na::Vector3<f64>,

    /// Per-axis gyroscope scale factors
    pub gyro_scale: na::Vector3<f64>,

    /// Per-axis accelerometer scale factors
    pub accel_scale: na::Vector3<f64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            gyro_noise: 0.01,
            accel_noise: 0.1,
            gyro_bias: na::Vector3::new(0.002, 0.001, -0.003),
            accel_bias: na::Vector3::new(0.05, -0.03, 0.02),
            gyro_scale: na::Vector3::new(1.02, 0.98, 1.01),
            accel_scale: na::Vector3::new(0.99, 1.01, 1.03),
        }
    }
}
