use std::fmt;
use thiserror::Error;

/// Primary error type for the AHRS crate
#[derive(Error, Debug)]
pub enum AhrsError {
    /// Configuration errors
    #[error("Configuration error in {sensor_type}: {message}")]
    ConfigurationError {
        /// Detailed error message
        message: String,
        /// The sensor the configuration belongs to
        sensor_type: SensorType,
        /// Configuration parameter that caused the error
        parameter: Option<String>,
    },

    /// A noise distribution could not be built
    #[error("Noise distribution error: {0}")]
    NoiseError(#[from] rand_distr::NormalError),
}

/// Types of sensors that could generate errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    /// Rate gyroscope
    Gyroscope,
    /// Accelerometer
    Accelerometer,
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorType::Gyroscope => write!(f, "gyroscope"),
            SensorType::Accelerometer => write!(f, "accelerometer"),
        }
    }
}

/// Helper functions for creating common errors
pub mod helpers {
    use super::*;

    /// Create a configuration error
    pub fn config_error(
        message: impl Into<String>,
        sensor_type: SensorType,
        parameter: Option<impl Into<String>>,
    ) -> AhrsError {
        AhrsError::ConfigurationError {
            message: message.into(),
            sensor_type,
            parameter: parameter.map(|p| p.into()),
        }
    }

    /// Check that a noise standard deviation is usable
    pub fn check_sigma(sigma: f64, sensor_type: SensorType, name: &str) -> Result<(), AhrsError> {
        if sigma.is_nan() || sigma.is_infinite() || sigma < 0.0 {
            Err(config_error(
                format!("Standard deviation {} must be finite and non-negative", sigma),
                sensor_type,
                Some(name),
            ))
        } else {
            Ok(())
        }
    }

    /// Check if a vector contains invalid values (NaN or infinite)
    pub fn check_vector_valid(
        vec: &nalgebra::Vector3<f64>,
        sensor_type: SensorType,
        name: &str,
    ) -> Result<(), AhrsError> {
        if vec.iter().any(|v| v.is_nan() || v.is_infinite()) {
            Err(config_error(
                format!("Vector {} contains NaN or infinite values", name),
                sensor_type,
                Some(name),
            ))
        } else {
            Ok(())
        }
    }
}

/// Type alias for Result with AhrsError
pub type AhrsResult<T> = Result<T, AhrsError>;
