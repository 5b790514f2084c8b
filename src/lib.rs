pub mod components;
pub mod physics;
pub mod resources;
pub mod systems;
pub mod utils;
pub mod vehicles;

pub use components::{DataInp, DataOut, SimulationState};
pub use resources::SimulationConfig;
pub use systems::{Recorder, SimulationManager, TrimSolver};
pub use utils::{ErrorKind, SimError};
