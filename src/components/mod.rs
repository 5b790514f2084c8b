pub mod controls;
pub mod io;
pub mod physics;
pub mod pid;
pub mod recorder;
pub mod spatial;
pub mod state;
pub mod statistics;
pub mod trim;

pub use controls::AircraftControlSurfaces;
pub use io::{AircraftType, DataInp, DataOut, InitialConditions};
pub use physics::PhysicsComponent;
pub use pid::{AntiWindup, PidController};
pub use recorder::{Binding, RecorderError, RecorderMode, SampleValue, Variable};
pub use spatial::SpatialComponent;
pub use state::SimulationState;
pub use statistics::{RunningStats, TimeStepSnapshot, TimeStepStatistics};
pub use trim::{
    FlightTrimState, GroundBounds, LateralBounds, LongitudinalBounds, TrimBounds, TrimCondition,
    TrimResult, TrimSolverConfig, TrimTermination,
};
