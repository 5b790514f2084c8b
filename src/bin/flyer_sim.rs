use std::process::ExitCode;
use std::rc::Rc;

use flyer_core::{
    physics::{FlatGround, Ground},
    systems::AltitudeHold,
    utils::rad_to_deg,
    vehicles::BuiltinAircraftFactory,
    DataInp, DataOut, SimError, SimulationConfig, SimulationManager, SimulationState,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Simulated seconds between progress log lines
const PROGRESS_INTERVAL: f64 = 1.0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SimError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration");
            SimulationConfig::load(&path)?
        }
        None => SimulationConfig::default(),
    };

    let scenario = config.scenario.clone();
    let factory = BuiltinAircraftFactory::with_configs(config.aircraft.clone());
    let ground: Rc<dyn Ground> = Rc::new(FlatGround::default());
    let mut manager = SimulationManager::new(config, Box::new(factory), ground)?;

    let mut input = DataInp {
        requested: SimulationState::Init,
        aircraft_type: scenario.aircraft_type.clone(),
        initial: scenario.initial,
        ..Default::default()
    };
    let mut output = DataOut::default();
    manager.step(scenario.tick, &input, &mut output)?;

    let mut hold = scenario
        .altitude_hold
        .enabled
        .then(|| AltitudeHold::new(&scenario.altitude_hold, output.altitude));
    if let Some(hold) = &hold {
        info!(target = hold.target(), "altitude hold engaged");
    }

    input.requested = SimulationState::Work;
    let ticks = (scenario.duration / scenario.tick).ceil() as usize;
    let mut next_report = 0.0;
    for _ in 0..ticks {
        if let Some(hold) = hold.as_mut() {
            input.controls.elevator = hold.update(scenario.tick, output.altitude);
        }
        manager.step(scenario.tick, &input, &mut output)?;
        if output.time >= next_report {
            info!(
                time = output.time,
                altitude = output.altitude,
                airspeed = output.airspeed,
                pitch_deg = rad_to_deg(output.attitude.y),
                elevator_deg = rad_to_deg(output.controls.elevator),
                replay = output.replay_active,
                "progress"
            );
            next_report += PROGRESS_INTERVAL;
        }
    }

    input.requested = SimulationState::Stop;
    manager.step(scenario.tick, &input, &mut output)?;

    let stats = &output.statistics;
    info!(
        ticks = stats.count,
        raw_mean = stats.raw_mean,
        raw_std_dev = stats.raw_std_dev,
        clamped_mean = stats.clamped_mean,
        below_nominal = stats.below_nominal,
        above_nominal = stats.above_nominal,
        trim_converged = output.trim_converged,
        "session complete"
    );
    Ok(())
}
