use std::sync::mpsc;

use ahrs::ImuSample;
use serde::{Deserialize, Serialize};

use crate::guidance::ControlMode;
use crate::mixer::PropellerBank;
use crate::state::{DroneState, FlightStatistics};
use crate::TelemetryError;

/// Everything an external recorder needs about one instant of the flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Simulated flight time in seconds
    pub timestamp: f64,
    pub state: DroneState,
    pub statistics: FlightStatistics,
    pub propellers: PropellerBank,
    pub imu: ImuSample,
    pub mode: ControlMode,
}

/// Destination for telemetry snapshots
///
/// Implementations must return promptly: the call happens inside the physics
/// tick.
pub trait TelemetrySink: Send {
    fn submit(&mut self, snapshot: TelemetrySnapshot) -> Result<(), TelemetryError>;
}

/// Sink that hands snapshots to a bounded queue without ever blocking
pub struct ChannelSink {
    tx: mpsc::SyncSender<TelemetrySnapshot>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::SyncSender<TelemetrySnapshot>) -> Self {
        ChannelSink { tx }
    }

    /// Create a sink and the receiving end of a queue holding `capacity` snapshots
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<TelemetrySnapshot>) {
        let (tx, rx) = mpsc::sync_channel(capacity);
        (ChannelSink::new(tx), rx)
    }
}

impl TelemetrySink for ChannelSink {
    fn submit(&mut self, snapshot: TelemetrySnapshot) -> Result<(), TelemetryError> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => TelemetryError::QueueFull,
            mpsc::TrySendError::Disconnected(_) => TelemetryError::Disconnected,
        })
    }
}

/// Limits how often snapshots are emitted, in simulated time
#[derive(Debug, Clone)]
pub struct TelemetryThrottle {
    interval: f64,
    last_emit: Option<f64>,
}

impl TelemetryThrottle {
    pub fn new(interval: f64) -> Self {
        TelemetryThrottle {
            interval,
            last_emit: None,
        }
    }

    /// Returns true, and records the emission, when a snapshot is due at `now`
    pub fn ready(&mut self, now: f64) -> bool {
        let due = match self.last_emit {
            None => true,
            // Tolerance absorbs accumulated floating point error in flight_time
            Some(last) => now - last >= self.interval - 1e-9,
        };
        if due {
            self.last_emit = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_emit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_limits_rate() {
        let mut throttle = TelemetryThrottle::new(0.2);
        let dt = 0.05;
        let emitted = (1..=40)
            .filter(|i| throttle.ready(*i as f64 * dt))
            .count();
        // Two seconds at 20 Hz with one snapshot every 0.2 s
        assert_eq!(emitted, 10);
    }

    #[test]
    fn test_throttle_reset_allows_immediate_emit() {
        let mut throttle = TelemetryThrottle::new(0.2);
        assert!(throttle.ready(1.0));
        assert!(!throttle.ready(1.05));
        throttle.reset();
        assert!(throttle.ready(0.05));
    }

    #[test]
    fn test_channel_sink_never_blocks() {
        let (mut sink, rx) = ChannelSink::bounded(1);
        let snapshot = sample_snapshot();
        assert_eq!(sink.submit(snapshot.clone()), Ok(()));
        assert_eq!(sink.submit(snapshot.clone()), Err(TelemetryError::QueueFull));
        assert_eq!(rx.recv().unwrap(), snapshot);
        drop(rx);
        assert_eq!(sink.submit(snapshot), Err(TelemetryError::Disconnected));
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        assert!(json.contains("\"mode\":\"Manual\""));
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode, ControlMode::Manual);
        assert_eq!(back.propellers.thrusts, [2.5; 4]);
        assert!((back.state.position.z - 3.0).abs() < 1e-12);
    }

    fn sample_snapshot() -> TelemetrySnapshot {
        use ahrs::{AccelerometerReading, GyroscopeReading, OrientationEstimate};

        TelemetrySnapshot {
            timestamp: 0.25,
            state: DroneState::default(),
            statistics: FlightStatistics::default(),
            propellers: PropellerBank {
                thrusts: [2.5; 4],
                speeds: [1500.0; 4],
                efficiencies: [1.0; 4],
            },
            imu: ImuSample {
                gyroscope: GyroscopeReading {
                    roll_rate: 0.0,
                    pitch_rate: 0.0,
                    yaw_rate: 0.0,
                    temperature: 25.0,
                },
                accelerometer: AccelerometerReading {
                    ax: 0.0,
                    ay: 0.0,
                    az: -9.81,
                    temperature: 25.0,
                    vibration: 0.2,
                },
                orientation_estimate: OrientationEstimate {
                    roll: 0.0,
                    pitch: 0.0,
                    yaw: 0.0,
                    confidence: 0.8,
                },
                motion_detected: false,
            },
            mode: ControlMode::Manual,
        }
    }
}
