use serde::{Deserialize, Serialize};

use crate::config::PropellerConfig;
use crate::control::{ControlInput, TRIM_THRUST};

/// Lowest thrust a spinning propeller produces
pub const MIN_PROPELLER_THRUST: f64 = 0.1;

const ROLL_GAIN: f64 = 0.5;
const PITCH_GAIN: f64 = 0.5;
const YAW_GAIN: f64 = 0.3;

const IDLE_SPEED: f64 = 500.0;
const SPEED_RANGE: f64 = 1500.0;

/// Per-propeller thrust and speed for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropellerBank {
    pub thrusts: [f64; 4],
    pub speeds: [f64; 4],
    pub efficiencies: [f64; 4],
}

impl PropellerBank {
    pub fn total_thrust(&self) -> f64 {
        self.thrusts.iter().sum()
    }
}

/// Quad-X mixer
///
/// Propeller order: 0 front-right, 1 rear-left, 2 front-left, 3 rear-right.
/// Each output is clipped on its own, so a saturating command can leave the
/// bank with less net thrust than requested, and the loss can be asymmetric.
#[derive(Debug, Clone)]
pub struct PropellerMixer {
    max_thrust: f64,
    efficiency: [f64; 4],
}

impl PropellerMixer {
    pub fn new(config: &PropellerConfig) -> Self {
        PropellerMixer {
            max_thrust: config.max_thrust,
            efficiency: config.efficiency,
        }
    }

    pub fn max_thrust(&self) -> f64 {
        self.max_thrust
    }

    pub fn mix(&self, total_thrust: f64, roll: f64, pitch: f64, yaw: f64) -> [f64; 4] {
        let base = total_thrust / 4.0;
        let r = roll * ROLL_GAIN;
        let p = pitch * PITCH_GAIN;
        let y = yaw * YAW_GAIN;

        let raw = [
            base - r + p - y,
            base + r - p - y,
            base + r + p + y,
            base - r - p + y,
        ];

        std::array::from_fn(|i| {
            (raw[i] * self.efficiency[i]).clamp(MIN_PROPELLER_THRUST, self.max_thrust)
        })
    }

    pub fn speed(&self, thrust: f64) -> f64 {
        IDLE_SPEED + SPEED_RANGE * (thrust / self.max_thrust).sqrt()
    }

    /// Wrap already computed thrusts with their derived speeds
    pub fn bank_from_thrusts(&self, thrusts: [f64; 4]) -> PropellerBank {
        PropellerBank {
            thrusts,
            speeds: thrusts.map(|t| self.speed(t)),
            efficiencies: self.efficiency,
        }
    }

    pub fn bank(&self, input: &ControlInput) -> PropellerBank {
        self.bank_from_thrusts(self.mix(input.thrust(), input.roll(), input.pitch(), input.yaw()))
    }

    /// Evenly shared trim thrust, as the bank stands after a reset
    pub fn trim_bank(&self) -> PropellerBank {
        self.bank_from_thrusts([TRIM_THRUST / 4.0; 4])
    }
}
