pub mod autopilot;
pub mod manager;
pub mod physics;
pub mod recorder;
pub mod trim;

pub use autopilot::AltitudeHold;
pub use manager::SimulationManager;
pub use recorder::Recorder;
pub use trim::{trim_aircraft, FlightTrim, GroundTrim, TrimOutcome, TrimProblem, TrimSolver};
