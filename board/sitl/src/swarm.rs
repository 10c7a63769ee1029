use std::{
    sync::{Arc, RwLock},
    thread::JoinHandle,
};

use anyhow::Context;
use autopilot::{
    AreaLimits, ControlMode, DroneState, FlightStatistics, SimulationConfig, TelemetrySink,
    Vehicle,
};
use log::{debug, info};
use nalgebra as na;

use crate::clock::FixedRate;

/// Swarm drones tick at 10 Hz
pub const SWARM_RATE_HZ: u32 = 10;

/// Gap between neighbouring drones on the start line, meters
const START_SPACING: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct DroneReport {
    pub id: usize,
    pub start: na::Vector3<f64>,
    pub mode: ControlMode,
    pub statistics: FlightStatistics,
    pub waypoints_reached: u32,
    pub inside_limits: bool,
}

pub struct SwarmPlan {
    /// One start position per drone; drone 0 leads
    pub starts: Vec<na::Vector3<f64>>,
    pub steps: usize,
    /// Sleep out each period; tests run flat out
    pub realtime: bool,
    /// Followers chase the leader, keeping their start offset
    pub follow_leader: bool,
}

impl SwarmPlan {
    /// Drones lined up along y, centered on the default start position
    pub fn line(drones: usize, steps: usize) -> Self {
        let center = DroneState::default().position;
        let half = drones.saturating_sub(1) as f64 / 2.0;
        let starts = (0..drones)
            .map(|i| center + na::Vector3::new(0.0, (i as f64 - half) * START_SPACING, 0.0))
            .collect();
        SwarmPlan {
            starts,
            steps,
            realtime: false,
            follow_leader: false,
        }
    }
}

/// Last published leader position, pulled by every follower each tick
type LeaderFeed = Arc<RwLock<na::Vector3<f64>>>;

/// Drones in autonomous or follow mode, one thread each, sharing one flight
/// volume
pub struct Swarm {
    workers: Vec<JoinHandle<anyhow::Result<DroneReport>>>,
}

impl Swarm {
    pub fn launch<F>(config: &SimulationConfig, plan: &SwarmPlan, mut sink: F) -> Self
    where
        F: FnMut(usize) -> Option<Box<dyn TelemetrySink>>,
    {
        let limits = Arc::new(config.area_limits);
        let leader_start = plan
            .starts
            .first()
            .copied()
            .unwrap_or_else(na::Vector3::zeros);
        let feed: LeaderFeed = Arc::new(RwLock::new(leader_start));

        let workers = plan
            .starts
            .iter()
            .enumerate()
            .map(|(id, start)| {
                let mut drone_config = config.clone();
                drone_config.seed = config.seed.map(|seed| seed.wrapping_add(id as u64));
                let role = match (id, plan.follow_leader) {
                    (0, true) => Role::Leader(Arc::clone(&feed)),
                    (_, true) => Role::Follower {
                        feed: Arc::clone(&feed),
                        offset: start - leader_start,
                    },
                    (_, false) => Role::Independent,
                };
                let flight = Flight {
                    id,
                    start: *start,
                    limits: Arc::clone(&limits),
                    telemetry: sink(id),
                    steps: plan.steps,
                    realtime: plan.realtime,
                    role,
                };
                std::thread::spawn(move || flight.fly(&drone_config))
            })
            .collect();
        info!("Launched swarm of {} drones", plan.starts.len());
        Swarm { workers }
    }

    pub fn join(self) -> anyhow::Result<Vec<DroneReport>> {
        self.workers
            .into_iter()
            .enumerate()
            .map(|(id, handle)| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("Drone {} thread panicked", id))?
            })
            .collect()
    }
}

enum Role {
    Independent,
    Leader(LeaderFeed),
    Follower {
        feed: LeaderFeed,
        offset: na::Vector3<f64>,
    },
}

struct Flight {
    id: usize,
    start: na::Vector3<f64>,
    limits: Arc<AreaLimits>,
    telemetry: Option<Box<dyn TelemetrySink>>,
    steps: usize,
    realtime: bool,
    role: Role,
}

impl Flight {
    fn fly(self, config: &SimulationConfig) -> anyhow::Result<DroneReport> {
        let id = self.id;
        let mut vehicle = Vehicle::with_start(config, self.limits, self.start)
            .with_context(|| format!("Failed to build drone {}", id))?;
        if let Some(sink) = self.telemetry {
            vehicle.attach_telemetry(sink);
        }
        if !matches!(self.role, Role::Follower { .. }) {
            vehicle.toggle_control_mode();
        }

        let mut pacer = FixedRate::hz(SWARM_RATE_HZ);
        let dt = pacer.dt();
        for _ in 0..self.steps {
            if let Role::Follower { feed, offset } = &self.role {
                vehicle.set_target(read_feed(feed) + offset);
            }
            vehicle.tick(dt);
            if let Role::Leader(feed) = &self.role {
                publish(feed, vehicle.state().position);
            }
            if self.realtime {
                pacer.wait();
            }
        }
        debug!("Drone {} finished in {:?} mode", id, vehicle.mode());

        Ok(DroneReport {
            id,
            start: vehicle.start_position(),
            mode: vehicle.mode(),
            statistics: *vehicle.statistics(),
            waypoints_reached: vehicle.waypoints_reached(),
            inside_limits: vehicle.area_limits().contains(&vehicle.state().position),
        })
    }
}

// A poisoned lock still holds the last position written before the panic
fn read_feed(feed: &LeaderFeed) -> na::Vector3<f64> {
    match feed.read() {
        Ok(position) => *position,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn publish(feed: &LeaderFeed, position: na::Vector3<f64>) {
    match feed.write() {
        Ok(mut guard) => *guard = position,
        Err(poisoned) => *poisoned.into_inner() = position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopilot::ChannelSink;

    #[test]
    fn test_line_spreads_starts() {
        let plan = SwarmPlan::line(3, 10);
        assert_eq!(plan.starts.len(), 3);
        assert_eq!(plan.starts[0], na::Vector3::new(0.0, -1.5, 3.0));
        assert_eq!(plan.starts[1], na::Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(plan.starts[2], na::Vector3::new(0.0, 1.5, 3.0));
    }

    #[test]
    fn test_swarm_drones_stay_inside_shared_volume() {
        let config = SimulationConfig {
            seed: Some(11),
            ..SimulationConfig::default()
        };
        let plan = SwarmPlan::line(4, 300);
        let reports = Swarm::launch(&config, &plan, |_| None).join().unwrap();

        assert_eq!(reports.len(), 4);
        for (expected_id, report) in reports.iter().enumerate() {
            assert_eq!(report.id, expected_id);
            assert_eq!(report.start, plan.starts[expected_id]);
            assert_eq!(report.mode, ControlMode::Auto);
            assert!(report.inside_limits);
            assert!((report.statistics.flight_time - 30.0).abs() < 1e-6);
            assert!(report.statistics.distance_traveled > 0.0);
        }
    }

    #[test]
    fn test_swarm_is_reproducible_per_seed() {
        let config = SimulationConfig {
            seed: Some(5),
            ..SimulationConfig::default()
        };
        let plan = SwarmPlan::line(2, 100);
        let first = Swarm::launch(&config, &plan, |_| None).join().unwrap();
        let second = Swarm::launch(&config, &plan, |_| None).join().unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.statistics, b.statistics);
            assert_eq!(a.waypoints_reached, b.waypoints_reached);
        }
    }

    #[test]
    fn test_followers_track_the_leader() {
        let config = SimulationConfig {
            seed: Some(8),
            ..SimulationConfig::default()
        };
        let plan = SwarmPlan {
            follow_leader: true,
            ..SwarmPlan::line(3, 200)
        };
        let reports = Swarm::launch(&config, &plan, |_| None).join().unwrap();

        assert_eq!(reports[0].mode, ControlMode::Auto);
        for follower in &reports[1..] {
            assert_eq!(follower.mode, ControlMode::Follow);
            assert_eq!(follower.waypoints_reached, 0);
            assert!(follower.inside_limits);
        }
    }

    #[test]
    fn test_start_outside_volume_fails_that_drone() {
        let config = SimulationConfig::default();
        let plan = SwarmPlan {
            starts: vec![na::Vector3::new(0.0, 0.0, 3.0), na::Vector3::new(0.0, 20.0, 3.0)],
            steps: 5,
            realtime: false,
            follow_leader: false,
        };
        assert!(Swarm::launch(&config, &plan, |_| None).join().is_err());
    }

    #[test]
    fn test_swarm_feeds_telemetry() {
        let (sink, rx) = ChannelSink::bounded(64);
        let mut sink = Some(sink);
        let config = SimulationConfig {
            seed: Some(2),
            ..SimulationConfig::default()
        };
        let plan = SwarmPlan::line(1, 10);
        Swarm::launch(&config, &plan, |_| {
            sink.take()
                .map(|sink| Box::new(sink) as Box<dyn TelemetrySink>)
        })
        .join()
        .unwrap();

        let snapshots: Vec<_> = rx.try_iter().collect();
        // One second of flight at 10 Hz, a snapshot every 0.2 s
        assert_eq!(snapshots.len(), 5);
        assert!(snapshots.iter().all(|s| s.mode == ControlMode::Auto));
    }
}
