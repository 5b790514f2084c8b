mod config;
mod state;

pub use config::{GroundBounds, LateralBounds, LongitudinalBounds, TrimBounds, TrimSolverConfig};
pub use state::{FlightTrimState, TrimCondition, TrimResult, TrimTermination};
