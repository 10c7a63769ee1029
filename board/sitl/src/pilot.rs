use autopilot::RcInput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PilotAction {
    Sticks(RcInput),
    EngageAuto,
    Hold,
}

struct Leg {
    until: f64,
    sticks: RcInput,
}

/// Stands in for a human on the transmitter: a short manual routine, then
/// a hand-over to waypoint guidance
pub struct ScriptedPilot {
    legs: Vec<Leg>,
    engaged: bool,
}

impl ScriptedPilot {
    pub fn new() -> Self {
        ScriptedPilot {
            legs: vec![
                // hover
                Leg {
                    until: 1.0,
                    sticks: RcInput::default(),
                },
                // climb
                Leg {
                    until: 3.0,
                    sticks: RcInput::sticks(0, 0, 0, 600),
                },
                // forward with a slow yaw
                Leg {
                    until: 5.0,
                    sticks: RcInput::sticks(0, 400, 300, 0),
                },
                // bank right and descend a little
                Leg {
                    until: 7.0,
                    sticks: RcInput::sticks(500, 0, 0, -300),
                },
                Leg {
                    until: 8.0,
                    sticks: RcInput::default(),
                },
            ],
            engaged: false,
        }
    }

    pub fn action(&mut self, flight_time: f64) -> PilotAction {
        if let Some(leg) = self.legs.iter().find(|leg| flight_time < leg.until) {
            return PilotAction::Sticks(leg.sticks);
        }
        if self.engaged {
            PilotAction::Hold
        } else {
            self.engaged = true;
            PilotAction::EngageAuto
        }
    }
}

impl Default for ScriptedPilot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pilot_flies_manual_then_engages_auto_once() {
        let mut pilot = ScriptedPilot::new();
        assert_eq!(pilot.action(0.0), PilotAction::Sticks(RcInput::default()));
        match pilot.action(2.0) {
            PilotAction::Sticks(input) => assert_eq!(input.channels[3], 600),
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(pilot.action(8.0), PilotAction::EngageAuto);
        assert_eq!(pilot.action(8.05), PilotAction::Hold);
        assert_eq!(pilot.action(30.0), PilotAction::Hold);
    }
}
