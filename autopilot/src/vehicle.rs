use std::sync::Arc;

use ahrs::{AccelerometerReading, GyroscopeReading, ImuSample, SensorModel};
use log::{debug, info, trace, warn};
use nalgebra as na;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::boundary::BoundaryEnforcer;
use crate::config::{AreaLimits, SimulationConfig};
use crate::control::{ControlInput, StickCommand, TRIM_THRUST};
use crate::dynamics::{RigidBodyIntegrator, WindModel};
use crate::guidance::{ControlMode, GuidanceController};
use crate::mixer::{PropellerBank, PropellerMixer};
use crate::rc::{RcInput, RcMapper};
use crate::state::{DroneState, FlightStatistics};
use crate::telemetry::{TelemetrySink, TelemetrySnapshot, TelemetryThrottle};
use crate::{AutopilotError, AutopilotResult, TelemetryError};

/// Body rate commanded per unit of attitude command
const RATE_GAIN: f64 = 0.8;

/// Keeps the sensor noise stream apart from the environment stream
const SENSOR_SEED_OFFSET: u64 = 0x5EED;

/// One simulated drone and everything it owns
///
/// A tick is `apply_control` followed by `update_physics`: guidance, mixer,
/// integrator, boundary enforcement, then an optional telemetry snapshot.
pub struct Vehicle {
    start: na::Vector3<f64>,
    state: DroneState,
    statistics: FlightStatistics,
    control_input: ControlInput,
    thrust: f64,
    propellers: PropellerBank,

    limits: Arc<AreaLimits>,
    mixer: PropellerMixer,
    integrator: RigidBodyIntegrator,
    boundary: BoundaryEnforcer,
    wind: WindModel,
    guidance: GuidanceController,
    sensors: SensorModel,
    rc_mapper: RcMapper,
    rng: StdRng,

    telemetry: Option<Box<dyn TelemetrySink>>,
    throttle: TelemetryThrottle,
}

impl Vehicle {
    pub fn new(config: &SimulationConfig) -> AutopilotResult<Self> {
        Self::with_shared_limits(config, Arc::new(config.area_limits))
    }

    /// Build a drone that flies in a volume shared with other drones
    pub fn with_shared_limits(
        config: &SimulationConfig,
        limits: Arc<AreaLimits>,
    ) -> AutopilotResult<Self> {
        Self::with_start(config, limits, DroneState::default().position)
    }

    /// Build a drone that starts, and resets, at `start`
    pub fn with_start(
        config: &SimulationConfig,
        limits: Arc<AreaLimits>,
        start: na::Vector3<f64>,
    ) -> AutopilotResult<Self> {
        config.validate()?;
        limits.validate()?;
        if !limits.contains(&start) {
            return Err(AutopilotError::invalid(
                "start",
                format!(
                    "({}, {}, {}) lies outside the area limits",
                    start.x, start.y, start.z
                ),
            ));
        }

        let (rng, sensors) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                SensorModel::with_seed(&config.sensors, seed.wrapping_add(SENSOR_SEED_OFFSET))?,
            ),
            None => (StdRng::from_entropy(), SensorModel::new(&config.sensors)?),
        };
        let mixer = PropellerMixer::new(&config.propellers);

        Ok(Vehicle {
            start,
            state: DroneState::at(start),
            statistics: FlightStatistics::default(),
            control_input: ControlInput::default(),
            thrust: TRIM_THRUST,
            propellers: mixer.trim_bank(),
            limits,
            mixer,
            integrator: RigidBodyIntegrator,
            boundary: BoundaryEnforcer::default(),
            wind: WindModel::new(&config.wind),
            guidance: GuidanceController::new(&config.guidance),
            sensors,
            rc_mapper: RcMapper::new(&config.rc),
            rng,
            telemetry: None,
            throttle: TelemetryThrottle::new(config.telemetry_interval),
        })
    }

    // Manual command relative to trim; always accepted, clamped into range
    pub fn set_control_input(&mut self, thrust_delta: f64, pitch: f64, roll: f64, yaw: f64) {
        self.control_input = ControlInput::from_stick(StickCommand {
            thrust_delta,
            pitch,
            roll,
            yaw,
        });
        self.propellers = self.mixer.bank(&self.control_input);
    }

    pub fn update_rc_input(&mut self, rc_input: RcInput) {
        let stick = self.rc_mapper.map(rc_input);
        self.set_control_input(stick.thrust_delta, stick.pitch, stick.roll, stick.yaw);
    }

    /// Resolve the command for the current mode into body rates, collective
    /// thrust and propeller thrusts
    pub fn apply_control(&mut self) {
        let command = self
            .guidance
            .command(&self.control_input, &self.state.position, &mut self.rng);

        self.state.angular_velocity =
            na::Vector3::new(command.roll(), command.pitch(), command.yaw()) * RATE_GAIN;
        self.thrust = command.thrust();
        self.propellers = self.mixer.bank(&command);
    }

    pub fn update_physics(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("Ignoring physics step with invalid dt {}", dt);
            return;
        }

        let wind = self.wind.sample(&mut self.rng);
        self.integrator
            .step(&mut self.state, &mut self.statistics, self.thrust, &wind, dt);
        self.boundary.enforce(&mut self.state, &self.limits);

        trace!(
            "t={:.2} pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
            self.statistics.flight_time,
            self.state.position.x,
            self.state.position.y,
            self.state.position.z,
            self.state.velocity.x,
            self.state.velocity.y,
            self.state.velocity.z
        );

        self.emit_telemetry();
    }

    pub fn tick(&mut self, dt: f64) {
        self.apply_control();
        self.update_physics(dt);
    }

    pub fn toggle_control_mode(&mut self) -> ControlMode {
        self.guidance.toggle(&mut self.rng)
    }

    /// Seek a target supplied by the tick driver, such as a leader position
    pub fn set_target(&mut self, target: na::Vector3<f64>) {
        self.guidance.follow(target);
    }

    pub fn reset(&mut self) {
        self.state = DroneState::at(self.start);
        self.statistics = FlightStatistics::default();
        self.control_input = ControlInput::default();
        self.thrust = TRIM_THRUST;
        self.propellers = self.mixer.trim_bank();
        self.guidance.reset();
        self.wind.reset();
        self.throttle.reset();
        self.sensors.calibrate();
        info!("Vehicle reset");
    }

    pub fn calibrate_sensors(&mut self) {
        self.sensors.calibrate();
    }

    pub fn attach_telemetry(&mut self, sink: Box<dyn TelemetrySink>) {
        self.throttle.reset();
        self.telemetry = Some(sink);
    }

    pub fn detach_telemetry(&mut self) -> Option<Box<dyn TelemetrySink>> {
        self.telemetry.take()
    }

    fn emit_telemetry(&mut self) {
        if self.telemetry.is_none() || !self.throttle.ready(self.statistics.flight_time) {
            return;
        }

        let snapshot = TelemetrySnapshot {
            timestamp: self.statistics.flight_time,
            state: self.state.clone(),
            statistics: self.statistics,
            propellers: self.propellers,
            imu: self.sensors.imu(&self.state.imu_truth()),
            mode: self.guidance.mode(),
        };

        let result = match self.telemetry.as_mut() {
            Some(sink) => sink.submit(snapshot),
            None => return,
        };
        match result {
            Ok(()) => {}
            Err(TelemetryError::QueueFull) => {
                debug!("Telemetry queue full, snapshot dropped");
            }
            Err(TelemetryError::Disconnected) => {
                warn!("Telemetry sink disconnected, detaching");
                self.telemetry = None;
            }
        }
    }

    pub fn gyroscope(&mut self) -> GyroscopeReading {
        self.sensors.gyroscope(&self.state.angular_velocity)
    }

    pub fn accelerometer(&mut self) -> AccelerometerReading {
        self.sensors
            .accelerometer(&self.state.linear_acceleration, &self.state.orientation)
    }

    pub fn imu(&mut self) -> ImuSample {
        self.sensors.imu(&self.state.imu_truth())
    }

    pub fn sensor_model_mut(&mut self) -> &mut SensorModel {
        &mut self.sensors
    }

    pub fn propeller_bank(&self) -> &PropellerBank {
        &self.propellers
    }

    pub fn area_limits(&self) -> &AreaLimits {
        &self.limits
    }

    pub fn start_position(&self) -> na::Vector3<f64> {
        self.start
    }

    pub fn state(&self) -> &DroneState {
        &self.state
    }

    pub fn statistics(&self) -> &FlightStatistics {
        &self.statistics
    }

    pub fn control_input(&self) -> &ControlInput {
        &self.control_input
    }

    /// Collective thrust currently applied to the airframe
    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn wind(&self) -> na::Vector3<f64> {
        self.wind.current()
    }

    pub fn mode(&self) -> ControlMode {
        self.guidance.mode()
    }

    pub fn target(&self) -> Option<na::Vector3<f64>> {
        self.guidance.target()
    }

    pub fn waypoints_reached(&self) -> u32 {
        self.guidance.waypoints_reached()
    }
}
