use crate::config::StickRates;
use crate::control::StickCommand;

/// Full stick deflection in raw channel units
pub const STICK_RANGE: i16 = 1000;

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct RcInput {
    pub channels: [i16; 32],
}

impl RcInput {
    pub fn sticks(roll: i16, pitch: i16, yaw: i16, throttle: i16) -> Self {
        let mut input = RcInput::default();
        input.channels[0] = roll;
        input.channels[1] = pitch;
        input.channels[2] = yaw;
        input.channels[3] = throttle;
        input
    }
}

#[derive(Default, Debug)]
pub struct RcMapper {
    rates: StickRates,
}

impl RcMapper {
    pub fn new(rates: &StickRates) -> Self {
        RcMapper {
            rates: rates.clone(),
        }
    }

    pub fn map(&self, input: RcInput) -> StickCommand {
        StickCommand {
            roll: normalize(input.channels[0]) * self.rates.roll,
            pitch: normalize(input.channels[1]) * self.rates.pitch,
            yaw: normalize(input.channels[2]) * self.rates.yaw,
            thrust_delta: normalize(input.channels[3]) * self.rates.thrust,
        }
    }
}

fn normalize(value: i16) -> f64 {
    f64::from(value.clamp(-STICK_RANGE, STICK_RANGE)) / f64::from(STICK_RANGE)
}
