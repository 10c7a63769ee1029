mod boundary;
mod config;
mod control;
mod dynamics;
mod error;
mod guidance;
mod mixer;
mod rc;
mod state;
mod telemetry;
mod vehicle;

pub use boundary::BoundaryEnforcer;
pub use config::{
    AreaLimits, GuidanceConfig, PropellerConfig, SimulationConfig, StickRates, WindConfig,
};
pub use control::{ControlInput, StickCommand, TRIM_THRUST};
pub use dynamics::{thrust_direction, RigidBodyIntegrator, WindModel, MAX_ANGLE};
pub use error::{AutopilotError, AutopilotResult, TelemetryError};
pub use guidance::{ControlMode, GuidanceController};
pub use mixer::{PropellerBank, PropellerMixer};
pub use rc::{RcInput, RcMapper};
pub use state::{DroneState, FlightStatistics};
pub use telemetry::{ChannelSink, TelemetrySink, TelemetrySnapshot, TelemetryThrottle};
pub use vehicle::Vehicle;

pub use ahrs::SensorConfig;
