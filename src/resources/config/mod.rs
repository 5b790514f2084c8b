mod recorder;
mod simulation;

pub use recorder::RecorderConfig;
pub use simulation::{AltitudeHoldConfig, ScenarioConfig, SimulationConfig, TimeStepConfig};
