use std::path::Path;
use std::rc::Rc;

use flyer_core::{
    components::{AircraftType, InitialConditions, RecorderMode},
    physics::{AircraftFactory, FlatGround, Ground},
    vehicles::BuiltinAircraftFactory,
    DataInp, DataOut, SimError, SimulationConfig, SimulationManager, SimulationState,
};

/// Builder for a manager wired to test collaborators
pub struct TestSimBuilder {
    config: SimulationConfig,
    factory: Option<Box<dyn AircraftFactory>>,
    ground: Rc<dyn Ground>,
    aircraft_type: AircraftType,
    initial: InitialConditions,
    time_step: f64,
}

impl Default for TestSimBuilder {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            factory: None,
            ground: Rc::new(FlatGround::default()),
            aircraft_type: AircraftType::GenericLight,
            initial: InitialConditions::default(),
            time_step: 0.01,
        }
    }
}

impl TestSimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_factory(mut self, factory: impl AircraftFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn with_ground(mut self, ground: impl Ground + 'static) -> Self {
        self.ground = Rc::new(ground);
        self
    }

    pub fn with_aircraft_type(mut self, aircraft_type: AircraftType) -> Self {
        self.aircraft_type = aircraft_type;
        self
    }

    pub fn with_initial(mut self, initial: InitialConditions) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_recorder(mut self, mode: RecorderMode, path: &Path, interval: f64) -> Self {
        self.config.recorder.mode = mode;
        self.config.recorder.path = path.to_path_buf();
        self.config.recorder.interval = interval;
        self
    }

    pub fn build(self) -> TestSim {
        let factory = self
            .factory
            .unwrap_or_else(|| Box::new(BuiltinAircraftFactory::new()));
        let manager = SimulationManager::new(self.config, factory, self.ground)
            .expect("test configuration should be valid");

        TestSim {
            manager,
            input: DataInp {
                aircraft_type: self.aircraft_type,
                initial: self.initial,
                ..Default::default()
            },
            output: DataOut::default(),
            time_step: self.time_step,
        }
    }
}

/// A manager plus the input and output frames it is driven with
pub struct TestSim {
    pub manager: SimulationManager,
    pub input: DataInp,
    pub output: DataOut,
    pub time_step: f64,
}

impl TestSim {
    pub fn request(&mut self, state: SimulationState) -> Result<(), SimError> {
        self.request_with_step(state, self.time_step)
    }

    pub fn request_with_step(&mut self, state: SimulationState, dt: f64) -> Result<(), SimError> {
        self.input.requested = state;
        self.manager.step(dt, &self.input, &mut self.output)
    }

    /// Initialise and leave the manager in Work
    pub fn start(&mut self) {
        self.request(SimulationState::Init)
            .expect("initialisation should succeed");
        assert_eq!(self.manager.state(), SimulationState::Work);
    }

    pub fn run_steps(&mut self, steps: usize) -> Result<(), SimError> {
        for _ in 0..steps {
            self.request(SimulationState::Work)?;
        }
        Ok(())
    }
}
