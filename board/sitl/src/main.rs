use ahrs::utils::rad_to_deg;
use autopilot::{DroneState, FlightStatistics, TelemetrySink, Vehicle};
use clock::FixedRate;
use log::{error, info};
use pilot::{PilotAction, ScriptedPilot};
use recorder::Recorder;
use settings::Settings;
use swarm::{Swarm, SwarmPlan};

mod clock;
mod pilot;
mod recorder;
mod settings;
mod swarm;

/// Single drone ticks at 20 Hz
const SOLO_RATE_HZ: u32 = 20;

enum State {
    Initializing,
    Running,
    Stopping,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load()?;
    let mut recorder = Recorder::start(&settings.telemetry_path)?;

    let result = if settings.drones > 1 {
        run_swarm(&settings, &recorder)
    } else {
        run_solo(&settings, &recorder)
    };

    let written = recorder.stop()?;
    info!("Wrote {} telemetry records", written);
    result
}

fn run_solo(settings: &Settings, recorder: &Recorder) -> anyhow::Result<()> {
    let mut pacer = FixedRate::hz(SOLO_RATE_HZ);
    let dt = pacer.dt();
    let total_steps = settings.steps(dt);

    let mut state = State::Initializing;
    let mut vehicle = None;
    let mut pilot = ScriptedPilot::new();
    let mut update_cycle_count = 0;
    loop {
        match state {
            State::Initializing => {
                info!("Initializing SITL drone");
                match Vehicle::new(&settings.config) {
                    Ok(mut v) => {
                        v.attach_telemetry(Box::new(recorder.sink(0)));
                        v.calibrate_sensors();
                        vehicle = Some(v);
                        state = State::Running;
                    }
                    Err(err) => {
                        error!("Failed to build vehicle: {:?}", err);
                        state = State::Stopping;
                    }
                }
            }
            State::Running => {
                let Some(v) = vehicle.as_mut() else {
                    state = State::Stopping;
                    continue;
                };
                match pilot.action(v.statistics().flight_time) {
                    PilotAction::Sticks(input) => v.update_rc_input(input),
                    PilotAction::EngageAuto => {
                        let mode = v.toggle_control_mode();
                        info!("Pilot handed over, now in {:?} mode", mode);
                    }
                    PilotAction::Hold => {}
                }
                v.tick(dt);

                update_cycle_count += 1;
                if update_cycle_count % SOLO_RATE_HZ as usize == 0 {
                    log_state(v.state(), v.statistics());
                }
                if update_cycle_count >= total_steps {
                    state = State::Stopping;
                }
                pacer.wait();
            }
            State::Stopping => {
                info!("Stopping");
                break;
            }
        }
    }

    let Some(mut v) = vehicle else {
        anyhow::bail!("Vehicle never started");
    };
    drop(v.detach_telemetry());
    let stats = v.statistics();
    info!(
        "Flight over: {:.1} s, {:.1} m travelled, max altitude {:.1} m, max speed {:.1} m/s, {} waypoints",
        stats.flight_time,
        stats.distance_traveled,
        stats.max_altitude,
        stats.max_speed,
        v.waypoints_reached()
    );
    Ok(())
}

fn run_swarm(settings: &Settings, recorder: &Recorder) -> anyhow::Result<()> {
    let steps = settings.steps(FixedRate::hz(swarm::SWARM_RATE_HZ).dt());
    let plan = SwarmPlan {
        realtime: true,
        follow_leader: settings.follow_leader,
        ..SwarmPlan::line(settings.drones, steps)
    };
    let swarm = Swarm::launch(&settings.config, &plan, |id| {
        Some(Box::new(recorder.sink(id)) as Box<dyn TelemetrySink>)
    });

    for report in swarm.join()? {
        info!(
            "Drone {} ({:?}): {:.1} m travelled, max altitude {:.1} m, {} waypoints, inside limits: {}",
            report.id,
            report.mode,
            report.statistics.distance_traveled,
            report.statistics.max_altitude,
            report.waypoints_reached,
            report.inside_limits
        );
    }
    Ok(())
}

fn log_state(state: &DroneState, stats: &FlightStatistics) {
    info!(
        "t={:.1}s pos=({:.2}, {:.2}, {:.2}) speed={:.2} m/s attitude=({:.1}, {:.1}, {:.1}) deg",
        stats.flight_time,
        state.position.x,
        state.position.y,
        state.position.z,
        state.speed(),
        rad_to_deg(state.orientation.x),
        rad_to_deg(state.orientation.y),
        rad_to_deg(state.orientation.z)
    );
}
