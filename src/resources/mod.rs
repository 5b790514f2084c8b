pub mod config;
mod errors;

pub use config::{
    AltitudeHoldConfig, RecorderConfig, ScenarioConfig, SimulationConfig, TimeStepConfig,
};
pub use errors::ConfigError;
