use serde::{Deserialize, Serialize};

/// Collective thrust that balances gravity for the unit-mass airframe
pub const TRIM_THRUST: f64 = 9.81;

pub const THRUST_RANGE: (f64, f64) = (5.0, 20.0);
pub const PITCH_LIMIT: f64 = 0.5;
pub const ROLL_LIMIT: f64 = 0.5;
pub const YAW_LIMIT: f64 = 0.3;

/// Thrust added per unit of manual thrust delta
const THRUST_DELTA_GAIN: f64 = 2.0;

/// Command for one tick: collective thrust and attitude rates
///
/// The fields are private so a value outside the valid envelope can never be
/// built; every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    thrust: f64,
    pitch: f64,
    roll: f64,
    yaw: f64,
}

impl Default for ControlInput {
    fn default() -> Self {
        ControlInput {
            thrust: TRIM_THRUST,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }
}

impl ControlInput {
    pub fn new(thrust: f64, pitch: f64, roll: f64, yaw: f64) -> Self {
        ControlInput {
            thrust: clamp(thrust, THRUST_RANGE.0, THRUST_RANGE.1, TRIM_THRUST),
            pitch: clamp(pitch, -PITCH_LIMIT, PITCH_LIMIT, 0.0),
            roll: clamp(roll, -ROLL_LIMIT, ROLL_LIMIT, 0.0),
            yaw: clamp(yaw, -YAW_LIMIT, YAW_LIMIT, 0.0),
        }
    }

    /// Manual command relative to trim thrust
    pub fn from_stick(stick: StickCommand) -> Self {
        Self::new(
            TRIM_THRUST + stick.thrust_delta * THRUST_DELTA_GAIN,
            stick.pitch,
            stick.roll,
            stick.yaw,
        )
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }
}

/// Raw pilot command before clamping
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StickCommand {
    pub thrust_delta: f64,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

// NaN collapses to the neutral value instead of poisoning the state.
fn clamp(value: f64, min: f64, max: f64, neutral: f64) -> f64 {
    if value.is_nan() {
        neutral
    } else {
        value.clamp(min, max)
    }
}
