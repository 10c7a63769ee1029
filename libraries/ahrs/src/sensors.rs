use nalgebra as na;
use serde::{Deserialize, Serialize};

/// True motion of the airframe that the synthetic sensors observe
#[derive(Debug, Clone, Copy, Default)]
pub struct ImuTruth {
    /// Euler angles (roll, pitch, yaw) in radians
    pub orientation: na::Vector3<f64>,

    /// Body angular rates (roll, pitch, yaw) in rad/s
    pub angular_velocity: na::Vector3<f64>,

    /// Linear acceleration in m/s^2, as integrated by the dynamics
    pub linear_acceleration: na::Vector3<f64>,

    /// Linear velocity in m/s
    pub velocity: na::Vector3<f64>,
}

/// Gyroscope sample in rad/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GyroscopeReading {
    pub roll_rate: f64,
    pub pitch_rate: f64,
    pub yaw_rate: f64,

    /// Die temperature in Celsius
    pub temperature: f64,
}

impl GyroscopeReading {
    pub fn rates(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.roll_rate, self.pitch_rate, self.yaw_rate)
    }
}

/// Accelerometer sample in m/s^2
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerReading {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,

    /// Die temperature in Celsius
    pub temperature: f64,

    /// Unitless vibration level
    pub vibration: f64,
}

impl AccelerometerReading {
    pub fn acceleration(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.ax, self.ay, self.az)
    }
}

/// Attitude estimated from a single accelerometer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationEstimate {
    pub roll: f64,
    pub pitch: f64,

    /// Not observable from the accelerometer; copied from the true state
    pub yaw: f64,

    /// 0.8 when the sample magnitude looks like 1 g, 0.3 otherwise
    pub confidence: f64,
}

/// Complete IMU bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub gyroscope: GyroscopeReading,
    pub accelerometer: AccelerometerReading,
    pub orientation_estimate: OrientationEstimate,
    pub motion_detected: bool,
}
