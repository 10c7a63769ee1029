use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutopilotError {
    #[error("Invalid area limits on {axis} axis: min {min} must be less than max {max}")]
    InvalidAreaLimits { axis: char, min: f64, max: f64 },

    #[error("Invalid configuration value for {parameter}: {message}")]
    InvalidConfig { parameter: String, message: String },

    #[error("Sensor setup failed: {0}")]
    Sensor(#[from] ahrs::AhrsError),
}

impl AutopilotError {
    pub(crate) fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        AutopilotError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

pub type AutopilotResult<T> = Result<T, AutopilotError>;

/// Failure to hand a snapshot to a telemetry sink
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Telemetry queue is full, snapshot dropped")]
    QueueFull,

    #[error("Telemetry receiver disconnected")]
    Disconnected,
}
