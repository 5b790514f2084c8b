use std::cell::Cell;
use std::rc::Rc;

use nalgebra::Vector3;
use tracing::{error, info, warn};

use crate::components::{
    AircraftControlSurfaces, AircraftType, Binding, DataInp, DataOut, RecorderMode, SimulationState,
    SpatialComponent, TimeStepStatistics, TrimBounds, TrimResult,
};
use crate::physics::{Aircraft, AircraftFactory, Ground, PhysicsError};
use crate::resources::SimulationConfig;
use crate::systems::recorder::Recorder;
use crate::systems::trim::{trim_aircraft, TrimSolver};
use crate::utils::{euler_to_quaternion, quaternion_to_euler, SimError};

/// Shared cells the recorder reads from and replays into.
///
/// Position and velocity are NED, attitude is roll/pitch/yaw and rates are
/// body axes.
#[derive(Debug, Default)]
struct TelemetryChannels {
    pos_n: Rc<Cell<f64>>,
    pos_e: Rc<Cell<f64>>,
    pos_d: Rc<Cell<f64>>,
    vel_n: Rc<Cell<f64>>,
    vel_e: Rc<Cell<f64>>,
    vel_d: Rc<Cell<f64>>,
    phi: Rc<Cell<f64>>,
    theta: Rc<Cell<f64>>,
    psi: Rc<Cell<f64>>,
    p: Rc<Cell<f64>>,
    q: Rc<Cell<f64>>,
    r: Rc<Cell<f64>>,
}

impl TelemetryChannels {
    fn named(&self) -> [(&'static str, &Rc<Cell<f64>>); 12] {
        [
            ("pos_n", &self.pos_n),
            ("pos_e", &self.pos_e),
            ("pos_d", &self.pos_d),
            ("vel_n", &self.vel_n),
            ("vel_e", &self.vel_e),
            ("vel_d", &self.vel_d),
            ("phi", &self.phi),
            ("theta", &self.theta),
            ("psi", &self.psi),
            ("p", &self.p),
            ("q", &self.q),
            ("r", &self.r),
        ]
    }

    fn register(&self, recorder: &mut Recorder, precision: usize) -> Result<(), SimError> {
        for (name, cell) in self.named() {
            recorder.add_variable(name, Binding::Double(Rc::clone(cell)), precision)?;
        }
        Ok(())
    }

    fn write(&self, spatial: &SpatialComponent) {
        let attitude = quaternion_to_euler(&spatial.attitude);
        self.pos_n.set(spatial.position.x);
        self.pos_e.set(spatial.position.y);
        self.pos_d.set(spatial.position.z);
        self.vel_n.set(spatial.velocity.x);
        self.vel_e.set(spatial.velocity.y);
        self.vel_d.set(spatial.velocity.z);
        self.phi.set(attitude.x);
        self.theta.set(attitude.y);
        self.psi.set(attitude.z);
        self.p.set(spatial.angular_velocity.x);
        self.q.set(spatial.angular_velocity.y);
        self.r.set(spatial.angular_velocity.z);
    }

    fn read(&self) -> SpatialComponent {
        SpatialComponent {
            position: Vector3::new(self.pos_n.get(), self.pos_e.get(), self.pos_d.get()),
            velocity: Vector3::new(self.vel_n.get(), self.vel_e.get(), self.vel_d.get()),
            attitude: euler_to_quaternion(self.phi.get(), self.theta.get(), self.psi.get()),
            angular_velocity: Vector3::new(self.p.get(), self.q.get(), self.r.get()),
        }
    }
}

fn clamp_controls(controls: AircraftControlSurfaces, bounds: &TrimBounds) -> AircraftControlSurfaces {
    let lon = &bounds.longitudinal_bounds;
    let lat = &bounds.lateral_bounds;
    AircraftControlSurfaces {
        elevator: controls.elevator.clamp(lon.elevator_range.0, lon.elevator_range.1),
        aileron: controls.aileron.clamp(lat.aileron_range.0, lat.aileron_range.1),
        rudder: controls.rudder.clamp(lat.rudder_range.0, lat.rudder_range.1),
        power_lever: controls
            .power_lever
            .clamp(lon.throttle_range.0, lon.throttle_range.1),
    }
}

fn physics_error(aircraft: &str, context: &str, source: PhysicsError) -> SimError {
    match source {
        PhysicsError::NonFinite { quantity, .. } => SimError::NonFinite {
            aircraft: aircraft.to_string(),
            phase: "work",
            quantity,
        },
        source => SimError::Physics {
            context: format!("{} for {}", context, aircraft),
            source,
        },
    }
}

/// Owns one simulated aircraft and advances it tick by tick through the
/// Idle, Init, Work, Freeze, Pause and Stop phases.
pub struct SimulationManager {
    config: SimulationConfig,
    factory: Box<dyn AircraftFactory>,
    ground: Rc<dyn Ground>,
    state: SimulationState,
    aircraft: Option<Box<dyn Aircraft>>,
    aircraft_type: Option<AircraftType>,
    trim_controls: AircraftControlSurfaces,
    trim_result: Option<TrimResult>,
    solver: TrimSolver,
    recorder: Recorder,
    telemetry: TelemetryChannels,
    statistics: TimeStepStatistics,
    time: f64,
}

impl SimulationManager {
    pub fn new(
        config: SimulationConfig,
        factory: Box<dyn AircraftFactory>,
        ground: Rc<dyn Ground>,
    ) -> Result<Self, SimError> {
        config.validate()?;

        let telemetry = TelemetryChannels::default();
        let mut recorder = Recorder::new();
        telemetry.register(&mut recorder, config.recorder.precision)?;

        Ok(Self {
            solver: TrimSolver::new(config.trim),
            config,
            factory,
            ground,
            state: SimulationState::Idle,
            aircraft: None,
            aircraft_type: None,
            trim_controls: AircraftControlSurfaces::default(),
            trim_result: None,
            recorder,
            telemetry,
            statistics: TimeStepStatistics::default(),
            time: 0.0,
        })
    }

    /// Advance one tick. `time_step` is the raw wall-clock duration; the
    /// clamped value is what the aircraft integrates.
    ///
    /// A NaN or infinite `time_step` is rejected before anything changes:
    /// the requested transition is not applied and the statistics are left
    /// untouched.
    pub fn step(
        &mut self,
        time_step: f64,
        input: &DataInp,
        output: &mut DataOut,
    ) -> Result<(), SimError> {
        if !time_step.is_finite() {
            error!(time_step, state = %self.state, "rejected non-finite time step");
            return Err(SimError::InvalidTimeStep(time_step));
        }

        let previous = self.state;
        let next = previous.transition(input.requested);
        if next != previous {
            info!(from = %previous, to = %next, "simulation state changed");
        }
        self.state = next;

        if next == SimulationState::Pause {
            output.state = next;
            return Ok(());
        }

        let limits = self.config.time_step;
        let dt = self
            .statistics
            .record(time_step, limits.min, limits.max, limits.nominal);

        let result = match next {
            SimulationState::Init => self.step_init(input),
            SimulationState::Work => self.step_work(dt, input),
            SimulationState::Stop if !previous.is_terminal() => self.stop(),
            SimulationState::Idle
            | SimulationState::Freeze
            | SimulationState::Pause
            | SimulationState::Stop => Ok(()),
        };

        self.write_output(output);
        result
    }

    /// Leave Stop (or any phase) for Idle, dropping the aircraft and closing
    /// the recorder.
    pub fn reset(&mut self) -> Result<(), SimError> {
        info!(from = %self.state, "simulation reset");
        self.state = SimulationState::Idle;
        self.aircraft = None;
        self.aircraft_type = None;
        self.trim_controls = AircraftControlSurfaces::default();
        self.trim_result = None;
        self.statistics.reset();
        self.time = 0.0;
        self.recorder.finalize()?;
        Ok(())
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn statistics(&self) -> &TimeStepStatistics {
        &self.statistics
    }

    pub fn trim_result(&self) -> Option<&TrimResult> {
        self.trim_result.as_ref()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Extra variables may be registered here before the session leaves Init.
    pub fn recorder_mut(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    pub fn aircraft(&self) -> Option<&dyn Aircraft> {
        self.aircraft.as_deref()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulated time since the session left Init [s]
    pub fn time(&self) -> f64 {
        self.time
    }

    fn step_init(&mut self, input: &DataInp) -> Result<(), SimError> {
        let result = self.initialize_session(input);
        if let Err(e) = &result {
            error!(aircraft = %input.aircraft_type, error = %e, "initialisation failed");
            self.state = SimulationState::Idle;
            self.aircraft = None;
            self.aircraft_type = None;
            self.trim_result = None;
        }
        result
    }

    fn initialize_session(&mut self, input: &DataInp) -> Result<(), SimError> {
        let aircraft_type = input.aircraft_type.clone();
        let mut aircraft =
            self.factory
                .create(&aircraft_type)
                .map_err(|source| SimError::AircraftCreation {
                    aircraft: aircraft_type.to_string(),
                    source,
                })?;

        let condition = input.initial.trim_condition();
        let outcome = trim_aircraft(&self.solver, &*aircraft, &*self.ground, &condition)
            .map_err(|source| SimError::Physics {
                context: format!("trimming {}", aircraft_type),
                source,
            })?;

        let result = &outcome.result;
        if result.converged {
            info!(
                aircraft = %aircraft_type,
                iterations = result.iterations,
                cost = result.cost,
                "trim converged"
            );
        } else {
            warn!(
                aircraft = %aircraft_type,
                iterations = result.iterations,
                cost = result.cost,
                termination = ?result.termination,
                "trim did not converge, starting from best estimate"
            );
        }

        aircraft.set_spatial(outcome.spatial);
        aircraft.set_controls(outcome.controls);
        self.telemetry.write(aircraft.spatial());
        self.trim_controls = outcome.controls;
        self.trim_result = Some(outcome.result);
        self.time = 0.0;

        let recorder = &self.config.recorder;
        self.recorder
            .initialize(recorder.mode, &recorder.path, recorder.interval)?;
        match self.recorder.mode() {
            // Session-start sample holds the trimmed state
            RecorderMode::Record => self.recorder.step(0.0)?,
            RecorderMode::Replay if self.recorder.is_replaying() => {
                aircraft.set_spatial(self.telemetry.read())
            }
            _ => {}
        }

        self.aircraft = Some(aircraft);
        self.aircraft_type = Some(aircraft_type);
        self.state = SimulationState::Work;
        Ok(())
    }

    fn step_work(&mut self, dt: f64, input: &DataInp) -> Result<(), SimError> {
        let Some(aircraft) = self.aircraft.as_mut() else {
            return Ok(());
        };

        if self.recorder.is_replaying() {
            let replayed = self.recorder.step(dt);
            aircraft.set_spatial(self.telemetry.read());
            self.time += dt;
            if !self.recorder.is_replaying() {
                info!(time = self.time, "replay finished, continuing live");
            }
            return replayed.map_err(SimError::from);
        }

        let controls = clamp_controls(
            self.trim_controls.offset_by(&input.controls),
            &self.config.trim.bounds,
        );
        aircraft.set_controls(controls);

        let name = aircraft.name().to_string();
        aircraft
            .step(dt, &*self.ground)
            .map_err(|source| physics_error(&name, "stepping", source))
            .map_err(|e| {
                error!(aircraft = %name, error = %e, "aircraft step failed");
                e
            })?;

        let quantity = if !aircraft.physics().loads_finite() {
            Some("force or moment")
        } else if !aircraft.spatial().is_finite() {
            Some("state")
        } else {
            None
        };
        if let Some(quantity) = quantity {
            error!(aircraft = %name, quantity, time = self.time, "non-finite value in aircraft");
            return Err(SimError::NonFinite {
                aircraft: name,
                phase: "work",
                quantity,
            });
        }

        self.time += dt;
        self.telemetry.write(aircraft.spatial());
        self.recorder.step(dt)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SimError> {
        let snapshot = self.statistics.snapshot();
        info!(
            aircraft = ?self.aircraft_type,
            time = self.time,
            ticks = snapshot.count,
            mean_step = snapshot.clamped_mean,
            records = self.recorder.records(),
            "simulation stopped"
        );
        self.recorder.finalize()?;
        Ok(())
    }

    fn write_output(&self, output: &mut DataOut) {
        output.state = self.state;
        output.time = self.time;
        output.statistics = self.statistics.snapshot();
        output.replay_active = self.recorder.is_replaying();
        match &self.trim_result {
            Some(result) => {
                output.trim_converged = result.converged;
                output.trim_iterations = result.iterations;
            }
            None => {
                output.trim_converged = false;
                output.trim_iterations = 0;
            }
        }

        let Some(aircraft) = self.aircraft.as_deref() else {
            output.position = Vector3::zeros();
            output.altitude = 0.0;
            output.altitude_agl = 0.0;
            output.attitude = Vector3::zeros();
            output.angular_rates = Vector3::zeros();
            output.velocity = Vector3::zeros();
            output.acceleration = Vector3::zeros();
            output.airspeed = 0.0;
            output.controls = AircraftControlSurfaces::default();
            return;
        };

        let spatial = aircraft.spatial();
        output.position = spatial.position;
        output.altitude = spatial.altitude();
        output.altitude_agl = self.ground.height_above(&spatial.position);
        output.attitude = quaternion_to_euler(&spatial.attitude);
        output.angular_rates = spatial.angular_velocity;
        output.velocity = spatial.velocity;
        output.acceleration = aircraft.acceleration();
        output.airspeed = spatial.velocity.norm();
        output.controls = *aircraft.controls();
    }
}
